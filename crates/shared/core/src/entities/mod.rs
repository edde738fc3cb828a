mod account;
mod cart;
mod item;
mod item_id;
mod session;
mod transaction;

pub use account::{Buyer, Credential, Seller, SellerRating};
pub use cart::{Cart, CartLine};
pub use item::{
    Feedback, Item, ItemDraft, MAX_KEYWORD_CHARS, MAX_KEYWORDS, MAX_NAME_CHARS, validate_name,
    validate_price,
};
pub use item_id::ItemId;
pub use session::{Session, SessionToken};
pub use transaction::{Transaction, TransactionId, TransactionLine};
