/// Read-only source of the access token attached to identity calls.
///
/// The token is owned outside the console (login flow, environment); adapters
/// ask for it on every request so a refreshed token is picked up without
/// rebuilding the client.
pub trait CredentialProviderPort: Send + Sync {
    fn access_token(&self) -> Option<String>;
}
