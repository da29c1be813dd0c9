//! Identity and session records shared by the login flow, the idle monitor and the server.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;

pub use principal::{Identity, Role};
pub use session::{
    SessionDomain, DomainPolicy, SessionRecord, PetugasLogin,
    CURRENT_USER_KEY, PETUGAS_LOGIN_KEY, DEFAULT_IDLE_TIMEOUT,
};
pub use provider::{Authenticator, LocalAuthenticator, RemoteAuthenticator, LoginMode, LoginRequest};
