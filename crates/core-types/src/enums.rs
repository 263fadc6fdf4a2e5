use serde::{Deserialize, Serialize};

/// Reachability of the data store as observed by one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyState {
    Connected,
    Unreachable,
}

impl DependencyState {
    pub fn is_connected(&self) -> bool {
        matches!(self, DependencyState::Connected)
    }

    /// Overall service status label used by the health endpoint.
    pub fn service_label(&self) -> &'static str {
        match self {
            DependencyState::Connected => "Aktív",
            DependencyState::Unreachable => "Adatbázis hiba",
        }
    }

    /// Database status label used by the health endpoint.
    pub fn database_label(&self) -> &'static str {
        match self {
            DependencyState::Connected => "Kapcsolódva",
            DependencyState::Unreachable => "Nem elérhető",
        }
    }
}
