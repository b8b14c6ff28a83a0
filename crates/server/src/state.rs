use std::sync::Arc;

use configs::StorageConfig;
use service::accounts::domain::UserRecord;
use service::accounts::AccountService;
use service::errors::ServiceError;
use service::library::GameLibrary;
use service::session::AuthSession;
use service::settings::SettingsStore;
use service::storage::JsonTable;
use service::user_data::UserDataStore;

pub type Accounts = AccountService<JsonTable<UserRecord>>;

/// Shared handles for every channel. Cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub accounts: Arc<Accounts>,
    pub library: Arc<GameLibrary>,
    pub settings: Arc<SettingsStore>,
    pub user_data: Arc<UserDataStore>,
    pub session: AuthSession,
}

impl ServerState {
    /// Bind every table to its file under the configured data directory.
    pub fn from_storage(storage: &StorageConfig) -> Result<Self, ServiceError> {
        let users = JsonTable::<UserRecord>::new(storage.users_path())?;
        Ok(Self {
            accounts: Arc::new(AccountService::new(Arc::new(users))),
            library: Arc::new(GameLibrary::new(storage.library_path())?),
            settings: Arc::new(SettingsStore::new(storage.settings_path())?),
            user_data: Arc::new(UserDataStore::new(storage.user_data_path())?),
            session: AuthSession::new(),
        })
    }
}
