//! Bank routes - account CRUD and statement import

pub mod api;

pub use api::{
    api_account_create, api_account_delete, api_account_update, api_accounts, api_bank_import,
};
