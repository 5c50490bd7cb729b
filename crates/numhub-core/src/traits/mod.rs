//! Ports - repository traits and the messaging gateway

mod gateway;
mod repositories;

pub use gateway::{
    ChatTarget, GatewayError, GatewayResult, MembershipStatus, MessageRef, MessagingGateway,
};
pub use repositories::{
    AdvertisementRepository, BroadcastRepository, ChannelRepository, CountryRepository,
    LedgerRepository, MaintenanceRepository, NumberRepository, ProofRepository, RepoResult,
    SettingsRepository, UserRepository,
};
