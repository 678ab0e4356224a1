pub mod category;
pub mod country;
pub mod order;
pub mod payment_method;
pub mod product;

pub use category::Category;
pub use country::Country;
pub use order::{Order, OrderItem};
pub use payment_method::PaymentMethod;
pub use product::Product;
