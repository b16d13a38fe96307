/**
 * Responsibility
 *  - One tag type + alias per content kind addressed by a public id
 *  - No decode logic here (see core.rs)
 */
use super::core::PublicId;

pub enum ServiceTag {}
pub type PublicServiceId = PublicId<ServiceTag>;

pub enum PortfolioTag {}
pub type PublicPortfolioId = PublicId<PortfolioTag>;

pub enum ExperienceTag {}
pub type PublicExperienceId = PublicId<ExperienceTag>;

pub enum EducationTag {}
pub type PublicEducationId = PublicId<EducationTag>;

pub enum SkillTag {}
pub type PublicSkillId = PublicId<SkillTag>;

pub enum TestimonialTag {}
pub type PublicTestimonialId = PublicId<TestimonialTag>;

pub enum ContactTag {}
pub type PublicContactId = PublicId<ContactTag>;
