//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowDownToLine as Withdraw, LuCoins as Fund, LuDownload as Download,
        LuExternalLink as ExternalLink, LuGlobe as Network, LuRefreshCw as Refresh,
        LuUser as User, LuWallet as Wallet,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowClockwise as Refresh, BsBoxArrowInDown as Withdraw,
        BsBoxArrowUpRight as ExternalLink, BsCoin as Fund, BsDownload as Download,
        BsGlobe as Network, BsPerson as User, BsWallet2 as Wallet,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(WALLET, Wallet);
themed_icon!(FUND, Fund);
themed_icon!(WITHDRAW, Withdraw);
themed_icon!(REFRESH, Refresh);
themed_icon!(DOWNLOAD, Download);
themed_icon!(EXTERNAL_LINK, ExternalLink);
themed_icon!(USER, User);
themed_icon!(NETWORK, Network);
