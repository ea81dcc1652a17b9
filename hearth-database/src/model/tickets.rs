use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_OPEN_PER_USER: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfig {
    pub category_id: Option<u64>,
    pub closed_category_id: Option<u64>,
    pub staff_role_id: Option<u64>,
    pub log_channel_id: Option<u64>,
    pub notification_channel_id: Option<u64>,
    pub max_open_per_user: u32,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            category_id: None,
            closed_category_id: None,
            staff_role_id: None,
            log_channel_id: None,
            notification_channel_id: None,
            max_open_per_user: DEFAULT_MAX_OPEN_PER_USER,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketConfigField {
    Category,
    ClosedCategory,
    StaffRole,
    LogChannel,
    NotificationChannel,
}

impl TicketConfigField {
    pub const ALL: [TicketConfigField; 5] = [
        Self::Category,
        Self::ClosedCategory,
        Self::StaffRole,
        Self::LogChannel,
        Self::NotificationChannel,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::ClosedCategory => "closedcategory",
            Self::StaffRole => "staffrole",
            Self::LogChannel => "logchannel",
            Self::NotificationChannel => "notifychannel",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|field| field.key() == wanted)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ticket {
    pub channel_id: u64,
    pub guild_id: u64,
    pub user_id: u64,
    pub display_name: String,
    pub sanitized_name: String,
    pub status: TicketStatus,
    pub created_at: u64,
    pub closed_at: Option<u64>,
    pub closed_by: Option<u64>,
}

pub struct NewTicket<'a> {
    pub channel_id: u64,
    pub guild_id: u64,
    pub user_id: u64,
    pub display_name: &'a str,
    pub sanitized_name: &'a str,
    pub created_at: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TicketStats {
    pub created: u64,
    pub closed: u64,
    pub deleted: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketCounter {
    Created,
    Closed,
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::{TicketConfigField, TicketStatus};

    #[test]
    fn config_fields_round_trip_their_keys() {
        for field in TicketConfigField::ALL {
            assert_eq!(TicketConfigField::from_key(field.key()), Some(field));
        }
        assert_eq!(
            TicketConfigField::from_key(" StaffRole "),
            Some(TicketConfigField::StaffRole)
        );
        assert_eq!(TicketConfigField::from_key("nope"), None);
    }

    #[test]
    fn status_parsing() {
        assert_eq!(TicketStatus::parse("open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::parse("closed"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::parse("archived"), None);
    }
}
