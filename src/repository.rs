use crate::{
    auth::Role,
    models::{
        AccountCredentials, Campaign, CampaignListing, CampaignUpdate, Donation, Donor,
        NewCampaign, Ngo, PendingNgo, UpdateNgoProfileRequest, VerificationSubmission,
    },
    verification::VerificationStatus,
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers and the session layer
/// only see `Arc<dyn Repository>`, so tests substitute an in-memory implementation.
///
/// Lookups return `Ok(None)` for a missing record; `Err` is reserved for store
/// failures.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    // NGO accounts are searched before donor accounts.
    async fn find_credentials(&self, email: &str) -> Result<Option<AccountCredentials>, sqlx::Error>;
    // True if the email belongs to any NGO or donor account.
    async fn email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn get_ngo(&self, id: Uuid) -> Result<Option<Ngo>, sqlx::Error>;
    async fn get_donor(&self, id: Uuid) -> Result<Option<Donor>, sqlx::Error>;
    // New NGOs start PENDING / unverified.
    async fn create_ngo(
        &self,
        email: &str,
        password_hash: &str,
        organization_name: &str,
    ) -> Result<Ngo, sqlx::Error>;
    async fn create_donor(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Donor, sqlx::Error>;
    async fn update_ngo_password(&self, email: &str, password_hash: &str) -> Result<bool, sqlx::Error>;

    // --- Verification ---
    async fn get_pending_ngos(&self) -> Result<Vec<PendingNgo>, sqlx::Error>;
    // Writes status and the matching is_verified flag in one statement.
    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error>;
    // Stores new verification details together with the resulting status.
    async fn submit_verification(
        &self,
        id: Uuid,
        submission: VerificationSubmission,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error>;
    // Partial update; never touches verification columns.
    async fn update_ngo_profile(
        &self,
        id: Uuid,
        req: UpdateNgoProfileRequest,
    ) -> Result<Option<Ngo>, sqlx::Error>;

    // --- Campaigns ---
    async fn get_active_campaigns(&self) -> Result<Vec<CampaignListing>, sqlx::Error>;
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, sqlx::Error>;
    async fn get_ngo_campaigns(&self, ngo_id: Uuid) -> Result<Vec<Campaign>, sqlx::Error>;
    async fn create_campaign(&self, ngo_id: Uuid, campaign: NewCampaign) -> Result<Campaign, sqlx::Error>;

    // --- Donations ---
    // Returns Ok(None) if the campaign does not exist.
    async fn record_donation(
        &self,
        donor_id: Uuid,
        campaign_id: Uuid,
        amount: f64,
    ) -> Result<Option<Donation>, sqlx::Error>;
    async fn get_donor_donations(&self, donor_id: Uuid) -> Result<Vec<Donation>, sqlx::Error>;

    // --- Campaign Updates ---
    async fn get_campaign_updates(&self, campaign_id: Uuid) -> Result<Vec<CampaignUpdate>, sqlx::Error>;
    async fn add_campaign_update(
        &self,
        campaign_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<CampaignUpdate, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const NGO_COLUMNS: &str = r#"
    id, email, organization_name, phone, location, website, logo,
    donation_needed, purpose, impact, is_verified, verification_status,
    created_at, updated_at
"#;

const CAMPAIGN_COLUMNS: &str = r#"
    id, ngo_id, title, description, target_amount, current_amount,
    deadline, upi_id, city, status, created_at
"#;

#[derive(FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    password_hash: String,
}

impl CredentialRow {
    fn with_role(self, role: Role) -> AccountCredentials {
        AccountCredentials {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            role,
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// find_credentials
    ///
    /// Mirrors the login order: the NGO table first, then donors.
    async fn find_credentials(&self, email: &str) -> Result<Option<AccountCredentials>, sqlx::Error> {
        let ngo = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, password_hash FROM ngos WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = ngo {
            return Ok(Some(row.with_role(Role::Ngo)));
        }

        let donor = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, password_hash FROM donors WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(donor.map(|row| row.with_role(Role::Donor)))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM ngos WHERE email = $1)
                OR EXISTS (SELECT 1 FROM donors WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_ngo(&self, id: Uuid) -> Result<Option<Ngo>, sqlx::Error> {
        sqlx::query_as::<_, Ngo>(&format!("SELECT {NGO_COLUMNS} FROM ngos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_donor(&self, id: Uuid) -> Result<Option<Donor>, sqlx::Error> {
        sqlx::query_as::<_, Donor>("SELECT id, email, name, created_at FROM donors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// create_ngo
    ///
    /// Inserts with `verification_status = 'PENDING'`, `is_verified = false` from the
    /// column defaults.
    async fn create_ngo(
        &self,
        email: &str,
        password_hash: &str,
        organization_name: &str,
    ) -> Result<Ngo, sqlx::Error> {
        sqlx::query_as::<_, Ngo>(&format!(
            r#"
            INSERT INTO ngos (id, email, password_hash, organization_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {NGO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(organization_name)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_donor(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Donor, sqlx::Error> {
        sqlx::query_as::<_, Donor>(
            r#"
            INSERT INTO donors (id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_ngo_password(&self, email: &str, password_hash: &str) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE ngos SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_pending_ngos(&self) -> Result<Vec<PendingNgo>, sqlx::Error> {
        sqlx::query_as::<_, PendingNgo>(
            r#"
            SELECT id, organization_name, email, phone, website, location,
                   purpose, impact, verification_status, created_at
            FROM ngos
            WHERE verification_status = 'PENDING'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// set_verification_status
    ///
    /// Single-row atomic update: readers see the state before or after, never a mix
    /// of the two columns.
    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        sqlx::query_as::<_, Ngo>(&format!(
            r#"
            UPDATE ngos
            SET verification_status = $2, is_verified = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {NGO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(status.is_verified())
        .fetch_optional(&self.pool)
        .await
    }

    async fn submit_verification(
        &self,
        id: Uuid,
        submission: VerificationSubmission,
        status: VerificationStatus,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        sqlx::query_as::<_, Ngo>(&format!(
            r#"
            UPDATE ngos
            SET phone = $2, location = $3, website = $4, logo = $5,
                verification_status = $6, is_verified = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {NGO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(submission.phone)
        .bind(submission.city)
        .bind(submission.website)
        .bind(submission.logo)
        .bind(status)
        .bind(status.is_verified())
        .fetch_optional(&self.pool)
        .await
    }

    /// update_ngo_profile
    ///
    /// `COALESCE` keeps any column whose field is `None`.
    async fn update_ngo_profile(
        &self,
        id: Uuid,
        req: UpdateNgoProfileRequest,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        sqlx::query_as::<_, Ngo>(&format!(
            r#"
            UPDATE ngos
            SET organization_name = COALESCE($2, organization_name),
                phone = COALESCE($3, phone),
                location = COALESCE($4, location),
                website = COALESCE($5, website),
                logo = COALESCE($6, logo),
                donation_needed = COALESCE($7, donation_needed),
                purpose = COALESCE($8, purpose),
                impact = COALESCE($9, impact),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {NGO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.organization_name)
        .bind(req.phone)
        .bind(req.location)
        .bind(req.website)
        .bind(req.logo)
        .bind(req.donation_needed)
        .bind(req.purpose)
        .bind(req.impact)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_campaigns(&self) -> Result<Vec<CampaignListing>, sqlx::Error> {
        sqlx::query_as::<_, CampaignListing>(
            r#"
            SELECT c.id, c.ngo_id, c.title, c.description, c.target_amount,
                   c.current_amount, c.deadline, c.upi_id, c.city, c.status,
                   c.created_at, n.organization_name, n.logo AS ngo_logo
            FROM campaigns c
            JOIN ngos n ON n.id = c.ngo_id
            WHERE LOWER(c.status) = 'active'
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_ngo_campaigns(&self, ngo_id: Uuid) -> Result<Vec<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE ngo_id = $1 ORDER BY created_at DESC"
        ))
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_campaign(&self, ngo_id: Uuid, campaign: NewCampaign) -> Result<Campaign, sqlx::Error> {
        sqlx::query_as::<_, Campaign>(&format!(
            r#"
            INSERT INTO campaigns
                (id, ngo_id, title, description, target_amount, deadline, upi_id, city, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(ngo_id)
        .bind(campaign.title)
        .bind(campaign.description)
        .bind(campaign.target_amount)
        .bind(campaign.deadline)
        .bind(campaign.upi_id)
        .bind(campaign.city)
        .fetch_one(&self.pool)
        .await
    }

    /// record_donation
    ///
    /// Locks the campaign row, inserts the donation and increments the running total
    /// in one transaction.
    async fn record_donation(
        &self,
        donor_id: Uuid,
        campaign_id: Uuid,
        amount: f64,
    ) -> Result<Option<Donation>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM campaigns WHERE id = $1 FOR UPDATE")
            .bind(campaign_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (id, campaign_id, donor_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, campaign_id, donor_id, amount, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(campaign_id)
        .bind(donor_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE campaigns SET current_amount = current_amount + $2 WHERE id = $1")
            .bind(campaign_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(donation))
    }

    async fn get_donor_donations(&self, donor_id: Uuid) -> Result<Vec<Donation>, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, campaign_id, donor_id, amount, created_at
            FROM donations
            WHERE donor_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_campaign_updates(&self, campaign_id: Uuid) -> Result<Vec<CampaignUpdate>, sqlx::Error> {
        sqlx::query_as::<_, CampaignUpdate>(
            r#"
            SELECT id, campaign_id, title, description, created_at
            FROM campaign_updates
            WHERE campaign_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_campaign_update(
        &self,
        campaign_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<CampaignUpdate, sqlx::Error> {
        sqlx::query_as::<_, CampaignUpdate>(
            r#"
            INSERT INTO campaign_updates (id, campaign_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, campaign_id, title, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(campaign_id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }
}
