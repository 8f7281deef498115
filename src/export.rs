//! `email|password` export lines for created accounts.

use crate::CreatedAccount;

impl CreatedAccount {
    /// This account as a single `email|password` line.
    pub fn export_line(&self) -> String {
        format!("{}|{}", self.email, self.password)
    }
}

/// All accounts as `email|password` lines joined by `\n`, without a trailing newline.
pub fn export_accounts(accounts: &[CreatedAccount]) -> String {
    accounts
        .iter()
        .map(CreatedAccount::export_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProvisionRequest;

    fn created(request: &ProvisionRequest) -> Vec<CreatedAccount> {
        request
            .addresses()
            .map(|email| CreatedAccount {
                email,
                password: request.password().to_string(),
            })
            .collect()
    }

    #[test]
    fn exports_one_line_per_account() {
        let request = ProvisionRequest::new(["alice", "bob"], "example.com", "secret").unwrap();
        let accounts = created(&request);

        assert_eq!(accounts[0].export_line(), "alice@example.com|secret");
        assert_eq!(
            export_accounts(&accounts),
            "alice@example.com|secret\nbob@example.com|secret"
        );
    }

    #[test]
    fn empty_export_is_empty_string() {
        assert_eq!(export_accounts(&[]), "");
    }
}
