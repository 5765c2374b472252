//! Application services for the partner-linking workflow.

mod linking;

pub use linking::{
    DissolutionOutcome, InvitationListing, InvitationView, LinkingError, LinkingResult,
    PartnerLinkingService,
};
