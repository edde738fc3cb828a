//! Action names of the store's RPC surface
//!
//! The store matches them after trimming and lowercasing.

pub const PING: &str = "ping";
pub const CREATE_ACCOUNT: &str = "create_account";
pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const VALIDATE_SESSION: &str = "validate_session";
pub const GET_SELLER_RATING: &str = "get_seller_rating";
pub const GET_SELLER_RATING_BY_ID: &str = "get_seller_rating_by_id";
pub const GET_SELLER_RATING_BY_SESSION: &str = "get_seller_rating_by_session";
pub const GET_BUYER_PURCHASES: &str = "get_buyer_purchases";
pub const CART_GET: &str = "cart_get";
pub const CART_ADD: &str = "cart_add";
pub const CART_REMOVE: &str = "cart_remove";
pub const CART_CLEAR: &str = "cart_clear";
pub const CART_SAVE: &str = "cart_save";
pub const REGISTER_ITEM: &str = "register_item";
pub const CHANGE_ITEM_PRICE: &str = "change_item_price";
pub const UPDATE_UNITS_REMOVE: &str = "update_units_remove";
pub const LIST_ITEMS_FOR_SELLER: &str = "list_items_for_seller";
pub const GET_ITEM: &str = "get_item";
pub const PROVIDE_FEEDBACK: &str = "provide_feedback";
pub const SEARCH: &str = "search";
pub const MAKE_PURCHASE: &str = "make_purchase";
pub const SWEEP_SESSIONS: &str = "sweep_sessions";
