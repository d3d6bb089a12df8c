//! # App Flavors
//!
//! The customer and admin apps share the same session machinery but differ
//! in which screens sit behind the gate.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which of the two apps a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppFlavor {
    /// Customer-facing ordering app.
    #[default]
    Customer,
    /// Admin management app.
    Admin,
}

/// A screen reachable from the root navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    // Customer, signed out
    Auth,
    // Customer, signed in
    ProductCatalog,
    Cart,
    CheckoutProcess,
    OrderManagement,
    SingleProductView,
    // Admin, signed out
    Login,
    Register,
    // Admin, signed in
    ManageProduct,
    ManageOrders,
    ManageUser,
}

impl Screen {
    /// Route name as registered with the navigator.
    #[must_use]
    pub fn route_name(self) -> &'static str {
        match self {
            Self::Auth => "Auth",
            Self::ProductCatalog => "ProductCatalog",
            Self::Cart => "Cart",
            Self::CheckoutProcess => "CheckoutProcess",
            Self::OrderManagement => "OrderManagement",
            Self::SingleProductView => "SingleProductView",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::ManageProduct => "Manage Product",
            Self::ManageOrders => "Manage Orders",
            Self::ManageUser => "Manage User",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

const CUSTOMER_SIGNED_OUT: &[Screen] = &[Screen::Auth];
const CUSTOMER_SIGNED_IN: &[Screen] = &[
    Screen::ProductCatalog,
    Screen::Cart,
    Screen::CheckoutProcess,
    Screen::OrderManagement,
    Screen::SingleProductView,
];
const ADMIN_SIGNED_OUT: &[Screen] = &[Screen::Login, Screen::Register];
const ADMIN_SIGNED_IN: &[Screen] = &[
    Screen::ManageProduct,
    Screen::ManageOrders,
    Screen::ManageUser,
];

/// One of the two disjoint navigation trees of a flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTree {
    flavor: AppFlavor,
    authenticated: bool,
    screens: &'static [Screen],
}

impl ScreenTree {
    /// Screens in registration order.
    #[must_use]
    pub fn screens(&self) -> &'static [Screen] {
        self.screens
    }

    /// Screen shown when the tree is mounted.
    #[must_use]
    pub fn initial_route(&self) -> Screen {
        self.screens[0]
    }

    /// Check whether a screen belongs to this tree.
    #[must_use]
    pub fn contains(&self, screen: Screen) -> bool {
        self.screens.contains(&screen)
    }

    /// Flavor this tree belongs to.
    #[must_use]
    pub fn flavor(&self) -> AppFlavor {
        self.flavor
    }

    /// Whether this is the signed-in tree.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl AppFlavor {
    /// Short lowercase name, also used as the storage directory.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    /// Tree mounted while nobody is signed in.
    #[must_use]
    pub fn unauthenticated_tree(self) -> ScreenTree {
        let screens = match self {
            Self::Customer => CUSTOMER_SIGNED_OUT,
            Self::Admin => ADMIN_SIGNED_OUT,
        };
        ScreenTree {
            flavor: self,
            authenticated: false,
            screens,
        }
    }

    /// Tree mounted once signed in.
    #[must_use]
    pub fn authenticated_tree(self) -> ScreenTree {
        let screens = match self {
            Self::Customer => CUSTOMER_SIGNED_IN,
            Self::Admin => ADMIN_SIGNED_IN,
        };
        ScreenTree {
            flavor: self,
            authenticated: true,
            screens,
        }
    }

    /// Default session file: `<config dir>/servicehub/<flavor>/session.json`.
    #[must_use]
    pub fn default_session_path(self) -> Option<PathBuf> {
        dirs::config_dir().map(|p| {
            p.join("servicehub")
                .join(self.as_str())
                .join("session.json")
        })
    }
}

impl fmt::Display for AppFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown app flavor '{other}'")),
        }
    }
}
