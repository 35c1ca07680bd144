/// Router Module Index
///
/// Routes are grouped by who may reach them. The NGO and admin groups sit under
/// the `/ngo` and `/admin` prefixes, which is the scope the access gate guards;
/// the gate's public set lives alongside them in the public group.

/// Routes reachable without a session: registration, login, password reset and
/// the public campaign listing.
pub mod public;

/// Routes for any signed-in account, resolved by the `Identity` extractor.
pub mod authenticated;

/// NGO area. Unverified NGOs only get through to the verification routes.
pub mod ngo;

/// Admin area, restricted to the reserved admin address.
pub mod admin;
