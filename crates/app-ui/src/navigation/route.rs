//! Route definitions
//!
//! [`Route`] is the typed form of a destination: each variant carries exactly
//! the parameters its screen needs. [`RouteKind`] is the field-less
//! discriminant used to key descriptors, saved stacks, and chrome rules.

use app_state::Payload;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::transition::RouteCategory;

// =============================================================================
// Route Parameters
// =============================================================================

/// Resolved parameters of a route, by declared name
pub type RouteParams = HashMap<String, String>;

/// Name of the product id path parameter
pub const PARAM_PRODUCT_ID: &str = "productId";
/// Name of the item id path parameter
pub const PARAM_ITEM_ID: &str = "itemId";
/// Name of the origin query parameter
pub const PARAM_FROM: &str = "from";

// =============================================================================
// Route Kinds
// =============================================================================

/// Every registered destination, without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// First-run walkthrough
    Onboarding,
    /// Shop home
    Shop,
    /// Full catalog listing
    AllProducts,
    /// Saved items
    Wishlist,
    /// User profile
    Profile,
    /// Catalog search
    Search,
    /// Product detail without a preselected product
    ProductDetail,
    /// Product detail for one product
    ProductDetailWithId,
    /// Shopping cart
    Cart,
    /// Catalog filter sheet
    ProductFilter,
    /// Checkout
    Checkout,
    /// Sign in
    SignIn,
    /// Sign up
    SignUp,
    /// Email entry
    Email,
    /// Forgot password
    ForgotPassword,
    /// Password reset code entry
    PasswordResetCode,
    /// New password entry
    SetNewPassword,
    /// Item details reached through a shared-element transition
    ItemDetails,
}

/// Destinations reachable from the bottom bar
pub const PRIMARY_DESTINATIONS: [RouteKind; 5] = [
    RouteKind::Shop,
    RouteKind::Search,
    RouteKind::Wishlist,
    RouteKind::Cart,
    RouteKind::Profile,
];

impl RouteKind {
    /// All kinds in registration order
    pub const ALL: [RouteKind; 18] = [
        RouteKind::Onboarding,
        RouteKind::Shop,
        RouteKind::AllProducts,
        RouteKind::Wishlist,
        RouteKind::Profile,
        RouteKind::Search,
        RouteKind::ProductDetail,
        RouteKind::ProductDetailWithId,
        RouteKind::Cart,
        RouteKind::ProductFilter,
        RouteKind::Checkout,
        RouteKind::SignIn,
        RouteKind::SignUp,
        RouteKind::Email,
        RouteKind::ForgotPassword,
        RouteKind::PasswordResetCode,
        RouteKind::SetNewPassword,
        RouteKind::ItemDetails,
    ];

    /// Route pattern in the navigation grammar
    pub fn pattern(&self) -> &'static str {
        match self {
            RouteKind::Onboarding => "onboarding",
            RouteKind::Shop => "shop",
            RouteKind::AllProducts => "all_products",
            RouteKind::Wishlist => "wishlist",
            RouteKind::Profile => "profile",
            RouteKind::Search => "search",
            RouteKind::ProductDetail => "product_detail",
            RouteKind::ProductDetailWithId => "product_detail/{productId}",
            RouteKind::Cart => "cart",
            RouteKind::ProductFilter => "product_filter",
            RouteKind::Checkout => "checkout",
            RouteKind::SignIn => "sign_in",
            RouteKind::SignUp => "sign_up",
            RouteKind::Email => "email",
            RouteKind::ForgotPassword => "forgot_password",
            RouteKind::PasswordResetCode => "password_reset_code",
            RouteKind::SetNewPassword => "set_new_password",
            RouteKind::ItemDetails => "details/{itemId}?from=shop",
        }
    }

    /// Declared parameter names
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            RouteKind::ProductDetailWithId => &[PARAM_PRODUCT_ID],
            RouteKind::ItemDetails => &[PARAM_ITEM_ID, PARAM_FROM],
            _ => &[],
        }
    }

    /// Animation category
    pub fn category(&self) -> RouteCategory {
        match self {
            RouteKind::Onboarding => RouteCategory::Onboarding,
            RouteKind::Shop
            | RouteKind::Search
            | RouteKind::Wishlist
            | RouteKind::Cart
            | RouteKind::Profile => RouteCategory::Primary,
            RouteKind::ProductFilter => RouteCategory::Sheet,
            RouteKind::SignIn
            | RouteKind::SignUp
            | RouteKind::Email
            | RouteKind::ForgotPassword
            | RouteKind::PasswordResetCode
            | RouteKind::SetNewPassword => RouteCategory::Auth,
            RouteKind::AllProducts
            | RouteKind::ProductDetail
            | RouteKind::ProductDetailWithId
            | RouteKind::Checkout
            | RouteKind::ItemDetails => RouteCategory::Detail,
        }
    }

    /// Payload slot the destination reads on first render
    pub fn required_payload(&self) -> Option<&'static str> {
        match self {
            RouteKind::ItemDetails => Some(SelectedItem::KEY),
            _ => None,
        }
    }

    /// Check if the bottom bar shows on this destination
    pub fn is_primary(&self) -> bool {
        PRIMARY_DESTINATIONS.contains(self)
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            RouteKind::Onboarding => "Welcome",
            RouteKind::Shop => "Shop",
            RouteKind::AllProducts => "All Products",
            RouteKind::Wishlist => "Wishlist",
            RouteKind::Profile => "Profile",
            RouteKind::Search => "Search",
            RouteKind::ProductDetail | RouteKind::ProductDetailWithId => "Product",
            RouteKind::Cart => "Cart",
            RouteKind::ProductFilter => "Filter",
            RouteKind::Checkout => "Checkout",
            RouteKind::SignIn => "Sign In",
            RouteKind::SignUp => "Sign Up",
            RouteKind::Email => "Email",
            RouteKind::ForgotPassword => "Forgot Password",
            RouteKind::PasswordResetCode => "Reset Code",
            RouteKind::SetNewPassword => "New Password",
            RouteKind::ItemDetails => "Details",
        }
    }
}

// =============================================================================
// Origins
// =============================================================================

/// Screen that started a transition into item details
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    /// Shop home
    #[default]
    Shop,
    /// Shopping cart
    Cart,
    /// Wishlist
    Wishlist,
    /// A value no recovery rule knows about
    Other(String),
}

impl Origin {
    /// Query-string form
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Shop => "shop",
            Origin::Cart => "cart",
            Origin::Wishlist => "wishlist",
            Origin::Other(value) => value,
        }
    }
}

impl From<&str> for Origin {
    fn from(value: &str) -> Self {
        match value {
            "shop" => Origin::Shop,
            "cart" => Origin::Cart,
            "wishlist" => Origin::Wishlist,
            other => Origin::Other(other.to_string()),
        }
    }
}

impl From<String> for Origin {
    fn from(value: String) -> Self {
        Origin::from(value.as_str())
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.as_str().to_string()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Routes
// =============================================================================

/// A destination with its typed parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", content = "params")]
pub enum Route {
    /// First-run walkthrough
    Onboarding,
    /// Shop home
    Shop,
    /// Full catalog listing
    AllProducts,
    /// Saved items
    Wishlist,
    /// User profile
    Profile,
    /// Catalog search
    Search,
    /// Product detail
    ProductDetail {
        /// Preselected product
        #[serde(skip_serializing_if = "Option::is_none")]
        product_id: Option<String>,
    },
    /// Shopping cart
    Cart,
    /// Catalog filter sheet
    ProductFilter,
    /// Checkout
    Checkout,
    /// Sign in
    SignIn,
    /// Sign up
    SignUp,
    /// Email entry
    Email,
    /// Forgot password
    ForgotPassword,
    /// Password reset code entry
    PasswordResetCode,
    /// New password entry
    SetNewPassword,
    /// Item details, fed by a [`SelectedItem`] payload
    ItemDetails {
        /// Catalog item id
        item_id: String,
        /// Screen the user came from
        #[serde(default)]
        from: Origin,
    },
}

impl Route {
    /// Item details opened from `from`
    pub fn item_details(item_id: impl Into<String>, from: Origin) -> Self {
        Route::ItemDetails {
            item_id: item_id.into(),
            from,
        }
    }

    /// The descriptor key of this route
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Onboarding => RouteKind::Onboarding,
            Route::Shop => RouteKind::Shop,
            Route::AllProducts => RouteKind::AllProducts,
            Route::Wishlist => RouteKind::Wishlist,
            Route::Profile => RouteKind::Profile,
            Route::Search => RouteKind::Search,
            Route::ProductDetail { product_id: None } => RouteKind::ProductDetail,
            Route::ProductDetail { product_id: Some(_) } => RouteKind::ProductDetailWithId,
            Route::Cart => RouteKind::Cart,
            Route::ProductFilter => RouteKind::ProductFilter,
            Route::Checkout => RouteKind::Checkout,
            Route::SignIn => RouteKind::SignIn,
            Route::SignUp => RouteKind::SignUp,
            Route::Email => RouteKind::Email,
            Route::ForgotPassword => RouteKind::ForgotPassword,
            Route::PasswordResetCode => RouteKind::PasswordResetCode,
            Route::SetNewPassword => RouteKind::SetNewPassword,
            Route::ItemDetails { .. } => RouteKind::ItemDetails,
        }
    }

    /// Parameter-free route for a kind that takes no parameters
    pub fn bare(kind: RouteKind) -> Option<Self> {
        Self::from_params(kind, &RouteParams::new())
    }

    /// Build a typed route from resolved parameters
    ///
    /// Returns `None` when a required parameter is missing or empty.
    pub fn from_params(kind: RouteKind, params: &RouteParams) -> Option<Self> {
        let route = match kind {
            RouteKind::Onboarding => Route::Onboarding,
            RouteKind::Shop => Route::Shop,
            RouteKind::AllProducts => Route::AllProducts,
            RouteKind::Wishlist => Route::Wishlist,
            RouteKind::Profile => Route::Profile,
            RouteKind::Search => Route::Search,
            RouteKind::ProductDetail => Route::ProductDetail { product_id: None },
            RouteKind::ProductDetailWithId => Route::ProductDetail {
                product_id: Some(non_empty(params, PARAM_PRODUCT_ID)?),
            },
            RouteKind::Cart => Route::Cart,
            RouteKind::ProductFilter => Route::ProductFilter,
            RouteKind::Checkout => Route::Checkout,
            RouteKind::SignIn => Route::SignIn,
            RouteKind::SignUp => Route::SignUp,
            RouteKind::Email => Route::Email,
            RouteKind::ForgotPassword => Route::ForgotPassword,
            RouteKind::PasswordResetCode => Route::PasswordResetCode,
            RouteKind::SetNewPassword => Route::SetNewPassword,
            RouteKind::ItemDetails => Route::ItemDetails {
                item_id: non_empty(params, PARAM_ITEM_ID)?,
                from: params
                    .get(PARAM_FROM)
                    .map(|value| Origin::from(value.as_str()))
                    .unwrap_or_default(),
            },
        };
        Some(route)
    }

    /// Name of an id parameter that is set but empty
    ///
    /// Such a route renders a path that does not resolve back to it.
    pub fn empty_param(&self) -> Option<&'static str> {
        match self {
            Route::ProductDetail {
                product_id: Some(product_id),
            } if product_id.is_empty() => Some(PARAM_PRODUCT_ID),
            Route::ItemDetails { item_id, .. } if item_id.is_empty() => Some(PARAM_ITEM_ID),
            _ => None,
        }
    }

    /// Parameters keyed by their declared names
    pub fn params(&self) -> RouteParams {
        let mut params = RouteParams::new();
        match self {
            Route::ProductDetail {
                product_id: Some(product_id),
            } => {
                params.insert(PARAM_PRODUCT_ID.to_string(), product_id.clone());
            }
            Route::ItemDetails { item_id, from } => {
                params.insert(PARAM_ITEM_ID.to_string(), item_id.clone());
                params.insert(PARAM_FROM.to_string(), from.as_str().to_string());
            }
            _ => {}
        }
        params
    }

    /// Get the navigation path for this route
    pub fn to_path(&self) -> String {
        match self {
            Route::ProductDetail {
                product_id: Some(product_id),
            } => format!("product_detail/{}", urlencoding::encode(product_id)),
            Route::ItemDetails { item_id, from } => format!(
                "details/{}?from={}",
                urlencoding::encode(item_id),
                urlencoding::encode(from.as_str())
            ),
            other => other.kind().pattern().to_string(),
        }
    }

    /// Check if the bottom bar shows on this route
    pub fn is_primary(&self) -> bool {
        self.kind().is_primary()
    }

    /// Get a display title for this route
    pub fn title(&self) -> &'static str {
        self.kind().title()
    }
}

fn non_empty(params: &RouteParams, name: &str) -> Option<String> {
    params.get(name).filter(|value| !value.is_empty()).cloned()
}

impl Default for Route {
    fn default() -> Self {
        Route::Onboarding
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Catalog item handed to the item details screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    /// Catalog item id
    pub item_id: String,
    /// Display name
    pub title: String,
    /// Hero image
    pub image_url: String,
    /// Price in minor units
    pub price_cents: u64,
}

impl Payload for SelectedItem {
    const KEY: &'static str = "selected_item";
}

// =============================================================================
// Tests
// =============================================================================
