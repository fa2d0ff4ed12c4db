/*
 * Responsibility
 * - Donation request の request/response DTO
 * - status 遷移ルール (pending → inprogress → done / canceled)
 */
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{is_blood_group, is_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    #[serde(rename = "inprogress")]
    InProgress,
    Done,
    Canceled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::InProgress => "inprogress",
            DonationStatus::Done => "done",
            DonationStatus::Canceled => "canceled",
        }
    }

    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (*self, next),
            (Pending, InProgress) | (Pending, Canceled) | (InProgress, Done) | (InProgress, Canceled)
        )
    }
}

impl FromStr for DonationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "inprogress" => Ok(DonationStatus::InProgress),
            "done" => Ok(DonationStatus::Done),
            "canceled" => Ok(DonationStatus::Canceled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_name: String,
    pub recipient_district: String,
    pub recipient_upazila: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: String,
    pub donation_date: NaiveDate,
    pub donation_time: String,
    pub request_message: Option<String>,
}

impl CreateDonationRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.requester_name.trim().is_empty() {
            return Err("requester_name is required");
        }
        if !is_email(self.requester_email.trim()) {
            return Err("requester_email is invalid");
        }
        let required = [
            (&self.recipient_name, "recipient_name is required"),
            (&self.recipient_district, "recipient_district is required"),
            (&self.recipient_upazila, "recipient_upazila is required"),
            (&self.hospital_name, "hospital_name is required"),
            (&self.full_address, "full_address is required"),
            (&self.donation_time, "donation_time is required"),
        ];
        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(message);
            }
        }
        if !is_blood_group(&self.blood_group) {
            return Err("blood_group is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDonationRequest {
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<String>,
    pub donation_date: Option<NaiveDate>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
}

impl UpdateDonationRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let texts = [
            &self.recipient_name,
            &self.recipient_district,
            &self.recipient_upazila,
            &self.hospital_name,
            &self.full_address,
            &self.donation_time,
        ];
        if texts
            .iter()
            .any(|v| v.as_ref().is_some_and(|s| s.trim().is_empty()))
        {
            return Err("fields cannot be empty");
        }
        if let Some(group) = &self.blood_group
            && !is_blood_group(group)
        {
            return Err("blood_group is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDonationStatusRequest {
    pub status: DonationStatus,
}

/// `?email=` on the requester listing. Paging/status come from `ListQuery`.
#[derive(Debug, Deserialize)]
pub struct RequesterQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct DonationRequestResponse {
    pub id: String, // encoded
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_name: String,
    pub recipient_district: String,
    pub recipient_upazila: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: String,
    pub donation_date: NaiveDate,
    pub donation_time: String,
    pub request_message: Option<String>,
    pub status: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
