//! Daemon method catalogue
//!
//! The set of methods with dedicated augmentation is closed, so dispatch is a
//! plain enum match rather than a registry of boxed callbacks.

/// Daemon method that fetches content by URI
pub const FETCH_METHOD: &str = "get";

/// Daemon method that lists fetched files
pub const LISTING_METHOD: &str = "file_list";

/// Method name prefixes that mark a call as account-scoped
const ACCOUNT_PREFIXES: [&str; 4] = ["wallet", "account", "address", "transaction"];

/// Whether a method operates on a specific account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodScope {
    /// Needs the caller's account id injected into its params
    Account,
    /// Forwarded untouched
    Public,
}

/// Classify a method name.
///
/// Account-scoped methods look like `<prefix>_<suffix>` where prefix is one of
/// `wallet`, `account`, `address` or `transaction` and the suffix is a
/// non-empty word.
pub fn classify(method: &str) -> MethodScope {
    match method.split_once('_') {
        Some((prefix, suffix))
            if ACCOUNT_PREFIXES.contains(&prefix)
                && !suffix.is_empty()
                && suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            MethodScope::Account
        }
        _ => MethodScope::Public,
    }
}

/// Hook set selected for a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Content fetch: validated request, URL-rewritten result, fetch event
    Fetch,
    /// File listing: every entry's download path rewritten
    Listing,
    /// Everything else, scoped by [`classify`]
    Generic(MethodScope),
}

impl MethodKind {
    /// Resolve the hook set for a method name. Evaluated once per call.
    pub fn of(method: &str) -> Self {
        match method {
            FETCH_METHOD => Self::Fetch,
            LISTING_METHOD => Self::Listing,
            other => Self::Generic(classify(other)),
        }
    }

    /// Whether the call must be rejected up front when no account is bound
    pub fn requires_account(self) -> bool {
        match self {
            Self::Fetch | Self::Listing => true,
            Self::Generic(scope) => scope == MethodScope::Account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_prefixed_methods_are_account_scoped() {
        for method in [
            "wallet_balance",
            "account_list",
            "address_unused",
            "transaction_list",
            "wallet_send_all",
            "account_balance",
        ] {
            assert_eq!(classify(method), MethodScope::Account, "{}", method);
        }
    }

    #[test]
    fn other_methods_are_public() {
        for method in [
            "status",
            "resolve",
            "get",
            "file_list",
            "wallet",
            "wallet_",
            "accounts_list",
            "my_wallet_balance",
            "wallet-balance",
            "",
        ] {
            assert_eq!(classify(method), MethodScope::Public, "{:?}", method);
        }
    }

    #[test]
    fn kind_resolution() {
        assert_eq!(MethodKind::of("get"), MethodKind::Fetch);
        assert_eq!(MethodKind::of("file_list"), MethodKind::Listing);
        assert_eq!(
            MethodKind::of("account_balance"),
            MethodKind::Generic(MethodScope::Account)
        );
        assert_eq!(MethodKind::of("status"), MethodKind::Generic(MethodScope::Public));
    }

    #[test]
    fn account_requirement() {
        assert!(MethodKind::Fetch.requires_account());
        assert!(MethodKind::Listing.requires_account());
        assert!(MethodKind::of("wallet_balance").requires_account());
        assert!(!MethodKind::of("status").requires_account());
    }
}
