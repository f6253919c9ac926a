mod provider;
mod token;

pub use provider::{
    ClientSecrets, ConsentFlow, Credential, CredentialProvider, FileCredentialProvider,
    HeadlessConsent,
};
pub use token::{StoredToken, TokenStore};
