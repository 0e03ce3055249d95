pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod favorites;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use favorites::Entity as Favorites;
pub use products::Entity as Products;
pub use users::Entity as Users;
