//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod consultation;
pub mod lawyer_profile;
pub mod rating;
pub mod user;
pub mod wallet;
pub mod wallet_transaction;

// Re-export specific types to avoid conflicts
pub use consultation::{
    Column as ConsultationColumn, ConsultationStatus, Entity as Consultation,
    Model as ConsultationModel,
};
pub use lawyer_profile::{
    Column as LawyerProfileColumn, Entity as LawyerProfile, Model as LawyerProfileModel,
};
pub use rating::{Column as RatingColumn, Entity as Rating, Model as RatingModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
pub use wallet_transaction::{
    Column as WalletTransactionColumn, Entity as WalletTransaction, Model as WalletTransactionModel,
    TransactionKind,
};
