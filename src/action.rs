use strum::Display;

use crate::domain::registration::RegisterError;
use crate::domain::token::{Token, TokenDetails};

/// Actions that can be triggered by user input or internal events.
///
/// Completion actions from background tasks carry the uid they were spawned
/// for (and, where the dialog is involved, the dialog epoch) so stale results
/// can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Tick,
    Suspend,
    Quit,
    Error(String),

    // Network
    SwitchNetwork(String),
    NodeStatus {
        network: String,
        result: Result<String, String>,
    },

    // Token lookup (bare uid entered in the add form)
    LookupToken(String),
    TokenLookupResult {
        uid: String,
        result: Result<Token, String>,
    },

    // Registration dialog lifecycle
    OpenTokenDialog(Token),
    CloseTokenDialog,
    TokenDetailsFetched {
        uid: String,
        epoch: u64,
        result: Result<TokenDetails, String>,
    },
    TokenValidated {
        uid: String,
        epoch: u64,
        result: Result<Token, RegisterError>,
    },
    TokenRegistered(Token),

    // Registry maintenance
    UnregisterToken(String),
}
