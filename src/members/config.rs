//! Invitation configuration.

/// Configuration for invitation management.
///
/// # Example
///
/// ```rust
/// use moorage::members::InvitationConfig;
///
/// let config = InvitationConfig::new()
///     .expiry_days(14)
///     .max_pending_per_target(100);
/// ```
#[derive(Clone, Debug)]
pub struct InvitationConfig {
    /// Days until an invitation expires.
    pub expiry_days: u32,

    /// Maximum pending invitations per tenant/project.
    pub max_pending_per_target: u32,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            expiry_days: 7,
            max_pending_per_target: 50,
        }
    }
}

impl InvitationConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set invitation expiry time in days.
    #[must_use]
    pub fn expiry_days(mut self, days: u32) -> Self {
        self.expiry_days = days;
        self
    }

    /// Set maximum pending invitations per resource.
    #[must_use]
    pub fn max_pending_per_target(mut self, max: u32) -> Self {
        self.max_pending_per_target = max;
        self
    }

    /// Get expiry duration in seconds.
    #[must_use]
    pub fn expiry_seconds(&self) -> u64 {
        u64::from(self.expiry_days) * 24 * 3600
    }
}
