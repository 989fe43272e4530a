//! # Messages
//!
//! Reply texts for the menu flow.

pub const MAIN_MENU: &str = concat!(
    "📋 **Main menu**\n",
    "1. Account information\n",
    "2. How to use this bot\n",
    "3. Contact support\n",
    "Type 1-3, or 'help' to see this menu again."
);

pub fn account_info(author_id: &str) -> String {
    format!(
        "🔐 **Account information**\n- ID: {author_id}\n- Status: Active\n\nType 'menu' to return to the main menu."
    )
}

pub const USAGE_GUIDE: &str = concat!(
    "📘 **How to use this bot**\n",
    "• Type 'menu' to open the menu.\n",
    "• Pick 1, 2 or 3.\n",
    "• Type 'exit' to leave."
);

pub const SUPPORT_CONTACT: &str = concat!(
    "📞 **Support**\n",
    "Phone: +1 555 0100\n",
    "Email: support@example.com\n",
    "Type 'menu' to return to the main menu."
);

pub const EXIT_CONFIRMATION: &str = "✅ Menu closed. Type 'menu' to open it again.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_info_mentions_author() {
        let text = account_info("@alice:example.org");
        assert!(text.contains("@alice:example.org"));
    }

    #[test]
    fn test_replies_are_not_empty() {
        for text in [MAIN_MENU, USAGE_GUIDE, SUPPORT_CONTACT, EXIT_CONFIRMATION] {
            assert!(!text.trim().is_empty());
        }
    }
}
