//! Domain types for campaigns, participants, and tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a campaign
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(Uuid);

impl CampaignId {
    /// Creates a new random `CampaignId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CampaignId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a participant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Creates a new random `ParticipantId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ParticipantId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Campaigns
// ============================================================================

/// Lifecycle state of a campaign.
///
/// The only transition is `Active` → `Completed` (performed by a draw);
/// `Completed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    /// Accepting participation; no winner drawn yet
    Active,
    /// Winner drawn; participation closed, record immutable
    Completed,
}

impl CampaignStatus {
    /// Storage representation of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raffle campaign.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign identifier
    pub id: CampaignId,
    /// Display title
    pub title: String,
    /// Long-form description
    pub description: String,
    /// Optional promotional image URL
    pub image_url: Option<String>,
    /// Ticket price (display value; no arithmetic is performed on it)
    pub price: f64,
    /// Scheduled draw date (advisory; draws are admin-triggered)
    pub draw_date: DateTime<Utc>,
    /// Lifecycle state
    pub status: CampaignStatus,
    /// Winning ticket number, set exactly when the campaign completes
    pub winner_number: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the campaign still accepts participation
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Payload for creating or replacing a campaign.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCampaign {
    /// Display title
    pub title: String,
    /// Long-form description
    pub description: String,
    /// Optional promotional image URL
    pub image_url: Option<String>,
    /// Ticket price
    pub price: f64,
    /// Scheduled draw date
    pub draw_date: DateTime<Utc>,
}

// ============================================================================
// Participants
// ============================================================================

/// A registered participant. One row per email, ever.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identifier
    pub id: ParticipantId,
    /// Full name as first submitted
    pub name: String,
    /// Email address; globally unique
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Self-reported region code
    pub state: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Self-reported region code
    pub state: String,
}

// ============================================================================
// Tickets
// ============================================================================

/// Sale state of a ticket. Allocation sells immediately; there are no
/// reservation states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Allocated and owned by a participant
    Sold,
}

impl TicketStatus {
    /// Storage representation of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sold => "SOLD",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SOLD" => Some(Self::Sold),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An allocated raffle ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,
    /// Six-digit decimal number, unique within the campaign
    pub number: String,
    /// Sale state
    pub status: TicketStatus,
    /// Owning campaign
    pub campaign_id: CampaignId,
    /// Owning participant
    pub participant_id: ParticipantId,
    /// Allocation timestamp
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Requests and outcomes
// ============================================================================

/// A participation submission, as seen by the service layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRequest {
    /// Target campaign
    pub campaign_id: CampaignId,
    /// Participant name
    pub name: String,
    /// Participant email
    pub email: String,
    /// Participant phone
    pub phone: String,
    /// Participant region code
    pub state: String,
}

/// Result of a completed draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawOutcome {
    /// The winning ticket number
    pub winner_number: String,
    /// The campaign as persisted after the transition
    pub campaign: Campaign,
}
