//! File, keychain and HTTP-backed implementations of the Quill collaborator
//! traits: project storage as a directory of JSON documents, the app state
//! record under the user data dir, API keys in the OS keychain, and an
//! OpenAI-compatible inference client.

pub mod app_state_store;
pub mod json_store;
pub mod keyring_vault;
pub mod openai_client;
pub mod paths;
pub mod project_storage;
pub mod prompt;

pub use app_state_store::FileAppStateStore;
pub use keyring_vault::KeyringVault;
pub use openai_client::OpenAiClient;
pub use project_storage::JsonProjectStorage;
