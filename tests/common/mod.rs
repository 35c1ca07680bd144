#![allow(dead_code)]

use async_trait::async_trait;
use changify::{
    AppConfig, AppState,
    auth::Role,
    models::{
        AccountCredentials, Campaign, CampaignListing, CampaignUpdate, Donation, Donor,
        NewCampaign, Ngo, PendingNgo, UpdateNgoProfileRequest, VerificationSubmission,
    },
    repository::{Repository, RepositoryState},
    storage::{MockStorageService, StorageState},
    verification::VerificationStatus,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "secret123";
pub const ADMIN_PASSWORD: &str = "admin-pass";

// --- IN-MEMORY REPOSITORY ---

#[derive(Default)]
struct Tables {
    // Each account row keeps its password hash next to it, like the real tables.
    ngos: Vec<(Ngo, String)>,
    donors: Vec<(Donor, String)>,
    campaigns: Vec<Campaign>,
    donations: Vec<Donation>,
    updates: Vec<CampaignUpdate>,
}

/// InMemoryRepo
///
/// `Repository` over plain vectors. Behaves like `PostgresRepository` for every
/// operation the handlers use; `failing()` turns every call into a store error.
#[derive(Default)]
pub struct InMemoryRepo {
    tables: Mutex<Tables>,
    fail: bool,
}

/// Low bcrypt cost keeps seeding fast.
fn quick_hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt hash")
}

fn store_error() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            fail: true,
        }
    }

    pub fn seed_ngo(&self, email: &str, status: VerificationStatus) -> Ngo {
        let now = Utc::now();
        let ngo = Ngo {
            id: Uuid::new_v4(),
            email: email.to_string(),
            organization_name: "Helping Hands".to_string(),
            is_verified: status.is_verified(),
            verification_status: status,
            created_at: now,
            updated_at: now,
            ..Default::default()
        };
        self.tables
            .lock()
            .unwrap()
            .ngos
            .push((ngo.clone(), quick_hash(TEST_PASSWORD)));
        ngo
    }

    pub fn seed_donor(&self, email: &str) -> Donor {
        let donor = Donor {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Dana Donor".to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .donors
            .push((donor.clone(), quick_hash(TEST_PASSWORD)));
        donor
    }

    pub fn seed_campaign(&self, ngo_id: Uuid) -> Campaign {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            ngo_id,
            title: "Clean Water".to_string(),
            description: "Wells for three villages".to_string(),
            target_amount: 10_000.0,
            current_amount: 0.0,
            deadline: Utc::now() + Duration::days(30),
            upi_id: "helping@upi".to_string(),
            city: "Pune".to_string(),
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().campaigns.push(campaign.clone());
        campaign
    }

    pub fn ngo_status(&self, id: Uuid) -> Option<(VerificationStatus, bool)> {
        self.tables
            .lock()
            .unwrap()
            .ngos
            .iter()
            .find(|(n, _)| n.id == id)
            .map(|(n, _)| (n.verification_status, n.is_verified))
    }

    pub fn ngo_password_hash(&self, email: &str) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .ngos
            .iter()
            .find(|(n, _)| n.email == email)
            .map(|(_, hash)| hash.clone())
    }

    pub fn campaign_total(&self, id: Uuid) -> Option<f64> {
        self.tables
            .lock()
            .unwrap()
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.current_amount)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Tables>, sqlx::Error> {
        if self.fail {
            return Err(store_error());
        }
        Ok(self.tables.lock().unwrap())
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn find_credentials(&self, email: &str) -> Result<Option<AccountCredentials>, sqlx::Error> {
        let t = self.guard()?;
        if let Some((ngo, hash)) = t.ngos.iter().find(|(n, _)| n.email == email) {
            return Ok(Some(AccountCredentials {
                id: ngo.id,
                email: ngo.email.clone(),
                password_hash: hash.clone(),
                role: Role::Ngo,
            }));
        }
        Ok(t
            .donors
            .iter()
            .find(|(d, _)| d.email == email)
            .map(|(donor, hash)| AccountCredentials {
                id: donor.id,
                email: donor.email.clone(),
                password_hash: hash.clone(),
                role: Role::Donor,
            }))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.ngos.iter().any(|(n, _)| n.email == email)
            || t.donors.iter().any(|(d, _)| d.email == email))
    }

    async fn get_ngo(&self, id: Uuid) -> Result<Option<Ngo>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.ngos.iter().find(|(n, _)| n.id == id).map(|(n, _)| n.clone()))
    }

    async fn get_donor(&self, id: Uuid) -> Result<Option<Donor>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.donors.iter().find(|(d, _)| d.id == id).map(|(d, _)| d.clone()))
    }

    async fn create_ngo(
        &self,
        email: &str,
        password_hash: &str,
        organization_name: &str,
    ) -> Result<Ngo, sqlx::Error> {
        let mut t = self.guard()?;
        let now = Utc::now();
        let ngo = Ngo {
            id: Uuid::new_v4(),
            email: email.to_string(),
            organization_name: organization_name.to_string(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        };
        t.ngos.push((ngo.clone(), password_hash.to_string()));
        Ok(ngo)
    }

    async fn create_donor(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Donor, sqlx::Error> {
        let mut t = self.guard()?;
        let donor = Donor {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        t.donors.push((donor.clone(), password_hash.to_string()));
        Ok(donor)
    }

    async fn update_ngo_password(&self, email: &str, password_hash: &str) -> Result<bool, sqlx::Error> {
        let mut t = self.guard()?;
        match t.ngos.iter_mut().find(|(n, _)| n.email == email) {
            Some((_, hash)) => {
                *hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_pending_ngos(&self) -> Result<Vec<PendingNgo>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.ngos
            .iter()
            .filter(|(n, _)| n.verification_status == VerificationStatus::Pending)
            .map(|(n, _)| PendingNgo {
                id: n.id,
                organization_name: n.organization_name.clone(),
                email: n.email.clone(),
                phone: n.phone.clone(),
                website: n.website.clone(),
                location: n.location.clone(),
                purpose: n.purpose.clone(),
                impact: n.impact.clone(),
                verification_status: n.verification_status,
                created_at: n.created_at,
            })
            .collect())
    }

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        let mut t = self.guard()?;
        Ok(t.ngos.iter_mut().find(|(n, _)| n.id == id).map(|(n, _)| {
            n.verification_status = status;
            n.is_verified = status.is_verified();
            n.updated_at = Utc::now();
            n.clone()
        }))
    }

    async fn submit_verification(
        &self,
        id: Uuid,
        submission: VerificationSubmission,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        let mut t = self.guard()?;
        Ok(t.ngos.iter_mut().find(|(n, _)| n.id == id).map(|(n, _)| {
            n.phone = submission.phone;
            n.location = submission.city;
            n.website = submission.website;
            n.logo = submission.logo;
            n.verification_status = status;
            n.is_verified = status.is_verified();
            n.updated_at = Utc::now();
            n.clone()
        }))
    }

    async fn update_ngo_profile(
        &self,
        id: Uuid,
        req: UpdateNgoProfileRequest,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        let mut t = self.guard()?;
        Ok(t.ngos.iter_mut().find(|(n, _)| n.id == id).map(|(n, _)| {
            if let Some(v) = req.organization_name {
                n.organization_name = v;
            }
            n.phone = req.phone.or(n.phone.take());
            n.location = req.location.or(n.location.take());
            n.website = req.website.or(n.website.take());
            n.logo = req.logo.or(n.logo.take());
            n.donation_needed = req.donation_needed.or(n.donation_needed);
            n.purpose = req.purpose.or(n.purpose.take());
            n.impact = req.impact.or(n.impact.take());
            n.clone()
        }))
    }

    async fn get_active_campaigns(&self) -> Result<Vec<CampaignListing>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.campaigns
            .iter()
            .filter(|c| c.status.eq_ignore_ascii_case("active"))
            .filter_map(|c| {
                let (ngo, _) = t.ngos.iter().find(|(n, _)| n.id == c.ngo_id)?;
                Some(CampaignListing {
                    id: c.id,
                    ngo_id: c.ngo_id,
                    title: c.title.clone(),
                    description: c.description.clone(),
                    target_amount: c.target_amount,
                    current_amount: c.current_amount,
                    deadline: c.deadline,
                    upi_id: c.upi_id.clone(),
                    city: c.city.clone(),
                    status: c.status.clone(),
                    created_at: c.created_at,
                    organization_name: ngo.organization_name.clone(),
                    ngo_logo: ngo.logo.clone(),
                })
            })
            .collect())
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn get_ngo_campaigns(&self, ngo_id: Uuid) -> Result<Vec<Campaign>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.campaigns.iter().filter(|c| c.ngo_id == ngo_id).cloned().collect())
    }

    async fn create_campaign(&self, ngo_id: Uuid, campaign: NewCampaign) -> Result<Campaign, sqlx::Error> {
        let mut t = self.guard()?;
        let created = Campaign {
            id: Uuid::new_v4(),
            ngo_id,
            title: campaign.title,
            description: campaign.description,
            target_amount: campaign.target_amount,
            current_amount: 0.0,
            deadline: campaign.deadline,
            upi_id: campaign.upi_id,
            city: campaign.city,
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        t.campaigns.push(created.clone());
        Ok(created)
    }

    async fn record_donation(
        &self,
        donor_id: Uuid,
        campaign_id: Uuid,
        amount: f64,
    ) -> Result<Option<Donation>, sqlx::Error> {
        let mut t = self.guard()?;
        let Some(campaign) = t.campaigns.iter_mut().find(|c| c.id == campaign_id) else {
            return Ok(None);
        };
        campaign.current_amount += amount;

        let donation = Donation {
            id: Uuid::new_v4(),
            campaign_id,
            donor_id,
            amount,
            created_at: Utc::now(),
        };
        t.donations.push(donation.clone());
        Ok(Some(donation))
    }

    async fn get_donor_donations(&self, donor_id: Uuid) -> Result<Vec<Donation>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.donations.iter().filter(|d| d.donor_id == donor_id).cloned().collect())
    }

    async fn get_campaign_updates(&self, campaign_id: Uuid) -> Result<Vec<CampaignUpdate>, sqlx::Error> {
        let t = self.guard()?;
        Ok(t.updates
            .iter()
            .filter(|u| u.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn add_campaign_update(
        &self,
        campaign_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<CampaignUpdate, sqlx::Error> {
        let mut t = self.guard()?;
        let update = CampaignUpdate {
            id: Uuid::new_v4(),
            campaign_id,
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        t.updates.push(update.clone());
        Ok(update)
    }
}

// --- STATE HELPERS ---

/// Local-mode config with a working admin password.
pub fn test_config() -> AppConfig {
    AppConfig {
        admin_password_hash: quick_hash(ADMIN_PASSWORD),
        ..AppConfig::default()
    }
}

pub fn test_state(repo: Arc<InMemoryRepo>) -> AppState {
    test_state_with(repo, test_config(), MockStorageService::new())
}

pub fn test_state_with(
    repo: Arc<InMemoryRepo>,
    config: AppConfig,
    storage: MockStorageService,
) -> AppState {
    AppState::new(
        repo as RepositoryState,
        Arc::new(storage) as StorageState,
        config,
    )
}
