//! External action names accepted by the front doors
//!
//! Clients may send `search_items_for_sale` or `SearchItemsForSale`; both
//! normalise to `searchitemsforsale` before matching.

use bazaar_core::MarketError;

/// Trim, lowercase and drop underscores
pub fn normalize_action(action: &str) -> String {
    action
        .trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyerAction {
    CreateAccount,
    Login,
    Logout,
    SearchItemsForSale,
    GetItem,
    AddItemToCart,
    RemoveItemFromCart,
    SaveCart,
    ClearCart,
    DisplayCart,
    ProvideFeedback,
    GetSellerRating,
    GetBuyerPurchases,
    MakePurchase,
}

impl BuyerAction {
    pub fn parse(action: &str) -> Result<Self, MarketError> {
        let action = normalize_action(action);
        Ok(match action.as_str() {
            "createaccount" => BuyerAction::CreateAccount,
            "login" => BuyerAction::Login,
            "logout" => BuyerAction::Logout,
            "searchitemsforsale" | "search" => BuyerAction::SearchItemsForSale,
            "getitem" => BuyerAction::GetItem,
            "additemtocart" => BuyerAction::AddItemToCart,
            "removeitemfromcart" => BuyerAction::RemoveItemFromCart,
            "savecart" => BuyerAction::SaveCart,
            "clearcart" => BuyerAction::ClearCart,
            "displaycart" => BuyerAction::DisplayCart,
            "providefeedback" => BuyerAction::ProvideFeedback,
            "getsellerrating" => BuyerAction::GetSellerRating,
            "getbuyerpurchases" => BuyerAction::GetBuyerPurchases,
            "makepurchase" => BuyerAction::MakePurchase,
            _ => return Err(MarketError::UnknownAction(action)),
        })
    }

    /// Everything but account creation, login and logout runs under a
    /// validated buyer session
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            BuyerAction::CreateAccount | BuyerAction::Login | BuyerAction::Logout
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerAction {
    CreateAccount,
    Login,
    Logout,
    GetSellerRating,
    RegisterItemForSale,
    ChangeItemPrice,
    UpdateUnitsForSale,
    DisplayItemsForSale,
}

impl SellerAction {
    pub fn parse(action: &str) -> Result<Self, MarketError> {
        let action = normalize_action(action);
        Ok(match action.as_str() {
            "createaccount" => SellerAction::CreateAccount,
            "login" => SellerAction::Login,
            "logout" => SellerAction::Logout,
            "getsellerrating" => SellerAction::GetSellerRating,
            "registeritemforsale" => SellerAction::RegisterItemForSale,
            "changeitemprice" => SellerAction::ChangeItemPrice,
            "updateunitsforsale" => SellerAction::UpdateUnitsForSale,
            "displayitemsforsale" => SellerAction::DisplayItemsForSale,
            _ => return Err(MarketError::UnknownAction(action)),
        })
    }

    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            SellerAction::CreateAccount | SellerAction::Login | SellerAction::Logout
        )
    }
}
