/*
 * Responsibility
 * - Aggregate view-models: public home page and admin dashboard
 */
use serde::{Deserialize, Serialize};

use super::contacts::ContactResponse;
use super::education::EducationResponse;
use super::experience::ExperienceResponse;
use super::personal_info::PersonalInfoResponse;
use super::portfolio::PortfolioResponse;
use super::services::ServiceResponse;
use super::skills::SkillResponse;
use super::testimonials::TestimonialResponse;
use crate::services::auth::Identity;

pub const DEFAULT_SITE_NAME: &str = "Personal Portfolio";

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Outcome of a contact form redirect: `success` | `error`.
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNotice {
    pub success: bool,
    pub message: &'static str,
}

impl HomeQuery {
    pub fn notice(&self) -> Option<ContactNotice> {
        match self.contact.as_deref()? {
            "success" => Some(ContactNotice {
                success: true,
                message: "Thank you for your message! We will get back to you soon.",
            }),
            "error" => Some(ContactNotice {
                success: false,
                message: "Sorry, there was an error sending your message. Please try again.",
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub site_name: String,
    pub personal_info: Option<PersonalInfoResponse>,
    pub services: Vec<ServiceResponse>,
    pub portfolios: Vec<PortfolioResponse>,
    pub experiences: Vec<ExperienceResponse>,
    pub education: Vec<EducationResponse>,
    pub skills: Vec<SkillResponse>,
    pub testimonials: Vec<TestimonialResponse>,
    pub contact: Option<ContactNotice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_contacts: i64,
    pub unread_contacts: i64,
    pub total_projects: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub admin: Identity,
    pub stats: DashboardStats,
    pub recent_contacts: Vec<ContactResponse>,
}

/// Admin list pages: every record (active or not) plus the outcome of the
/// last mutation carried in the redirect query.
#[derive(Debug, Serialize)]
pub struct AdminList<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutcomeQuery {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> AdminList<T> {
    pub fn new(items: Vec<T>, outcome: OutcomeQuery) -> Self {
        Self {
            items,
            success: outcome.success,
            error: outcome.error,
        }
    }
}
