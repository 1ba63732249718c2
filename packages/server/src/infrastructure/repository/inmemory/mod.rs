mod membership;

pub use membership::InMemoryMembershipStore;
