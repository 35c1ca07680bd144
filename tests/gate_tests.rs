use changify::{
    auth::{Identity, Role},
    config::DEFAULT_ADMIN_EMAIL,
    gate::{AccessGate, GateDecision, RouteClass, RouteTable},
    verification::VerificationStatus,
};

// --- Fixtures ---

fn gate() -> AccessGate {
    AccessGate::new(RouteTable::default(), DEFAULT_ADMIN_EMAIL)
}

fn admin() -> Identity {
    Identity::admin(DEFAULT_ADMIN_EMAIL)
}

fn ngo(status: VerificationStatus) -> Identity {
    Identity {
        subject_id: "6f1c2a50-6f5e-4c59-9d55-3f0b3c1e9a10".to_string(),
        email: "ngo@example.org".to_string(),
        role: Role::Ngo,
        is_verified: status.is_verified(),
        verification_status: Some(status),
    }
}

fn donor() -> Identity {
    Identity {
        subject_id: "0b7a0d2e-2a4d-4f3e-8a1b-5c6d7e8f9a0b".to_string(),
        email: "donor@example.org".to_string(),
        role: Role::Donor,
        is_verified: false,
        verification_status: None,
    }
}

fn redirect(target: &str) -> GateDecision {
    GateDecision::RedirectTo(target.to_string())
}

const NGO_AREA: &[&str] = &[
    "/ngo",
    "/ngo/dashboard",
    "/ngo/campaigns",
    "/ngo/campaigns/123/updates",
    "/ngo/profile",
];

// --- Public routes ---

#[test]
fn test_public_routes_allow_every_caller() {
    let gate = gate();
    let callers = [
        None,
        Some(admin()),
        Some(donor()),
        Some(ngo(VerificationStatus::Pending)),
        Some(ngo(VerificationStatus::Rejected)),
        Some(ngo(VerificationStatus::Verified)),
    ];

    for path in &gate.routes().public {
        for caller in &callers {
            assert_eq!(
                gate.evaluate(caller.as_ref(), path),
                GateDecision::Allow,
                "public path {path} must allow {caller:?}"
            );
        }
    }
}

#[test]
fn test_public_match_is_exact_not_prefix() {
    let gate = gate();
    let unverified = ngo(VerificationStatus::Pending);

    // A child of a public route is not public.
    assert_eq!(
        gate.evaluate(Some(&unverified), "/ngo/login/extra"),
        redirect("/ngo/verification")
    );
    assert_eq!(gate.evaluate(None, "/ngo/login/extra"), GateDecision::Unauthorized);
    assert_eq!(gate.evaluate(None, "/admin/login/"), GateDecision::Unauthorized);
}

// --- Unauthenticated ---

#[test]
fn test_missing_identity_is_unauthorized_on_guarded_routes() {
    let gate = gate();
    for path in ["/admin", "/admin/pending-ngos", "/ngo/dashboard", "/ngo/verification"] {
        assert_eq!(gate.evaluate(None, path), GateDecision::Unauthorized, "{path}");
    }
}

// --- Admin area ---

#[test]
fn test_admin_area_allows_reserved_address_only() {
    let gate = gate();

    assert_eq!(gate.evaluate(Some(&admin()), "/admin"), GateDecision::Allow);
    assert_eq!(
        gate.evaluate(Some(&admin()), "/admin/verify-ngo"),
        GateDecision::Allow
    );

    for caller in [
        donor(),
        ngo(VerificationStatus::Verified),
        ngo(VerificationStatus::Pending),
    ] {
        assert_eq!(
            gate.evaluate(Some(&caller), "/admin/pending-ngos"),
            redirect("/admin/login")
        );
    }
}

#[test]
fn test_admin_check_is_by_email_not_role() {
    let gate = gate();

    // An NGO account that somehow carries the reserved address is still the admin.
    let mut impostor_role = ngo(VerificationStatus::Pending);
    impostor_role.email = DEFAULT_ADMIN_EMAIL.to_string();
    assert_eq!(
        gate.evaluate(Some(&impostor_role), "/admin/pending-ngos"),
        GateDecision::Allow
    );

    // An admin role with a different address is not.
    let other_admin = Identity::admin("someone@changify.com");
    assert_eq!(
        gate.evaluate(Some(&other_admin), "/admin"),
        redirect("/admin/login")
    );
}

#[test]
fn test_admin_email_comparison_is_case_sensitive() {
    let gate = gate();
    let shouting = Identity::admin(DEFAULT_ADMIN_EMAIL.to_uppercase());
    assert_eq!(
        gate.evaluate(Some(&shouting), "/admin"),
        redirect("/admin/login")
    );
}

#[test]
fn test_admin_prefix_is_segment_aligned() {
    let gate = gate();
    let routes = gate.routes();

    assert_eq!(routes.classify("/administrative"), RouteClass::OtherAuthenticated);
    assert!(!routes.guards("/administrative"));
    assert_eq!(
        gate.evaluate(Some(&donor()), "/administrative"),
        GateDecision::Allow
    );
    // Prefix matching is case-sensitive.
    assert_eq!(routes.classify("/Admin"), RouteClass::OtherAuthenticated);
}

// --- NGO area ---

#[test]
fn test_ngo_area_sends_non_ngos_home() {
    let gate = gate();
    for caller in [donor(), admin()] {
        for path in NGO_AREA.iter().chain(["/ngo/verification"].iter()) {
            assert_eq!(gate.evaluate(Some(&caller), path), redirect("/"), "{path}");
        }
    }
}

#[test]
fn test_verified_ngo_reaches_whole_ngo_area() {
    let gate = gate();
    let verified = ngo(VerificationStatus::Verified);
    for path in NGO_AREA.iter().chain(["/ngo/verification"].iter()) {
        assert_eq!(gate.evaluate(Some(&verified), path), GateDecision::Allow, "{path}");
    }
}

#[test]
fn test_unverified_ngo_is_held_at_verification() {
    let gate = gate();
    for status in [VerificationStatus::Pending, VerificationStatus::Rejected] {
        let caller = ngo(status);

        assert_eq!(
            gate.evaluate(Some(&caller), "/ngo/verification"),
            GateDecision::Allow
        );
        for path in NGO_AREA {
            assert_eq!(
                gate.evaluate(Some(&caller), path),
                redirect("/ngo/verification"),
                "{status} NGO on {path}"
            );
        }
    }
}

#[test]
fn test_verification_route_is_exact() {
    let gate = gate();
    let caller = ngo(VerificationStatus::Pending);
    assert_eq!(
        gate.evaluate(Some(&caller), "/ngo/verification/upload"),
        redirect("/ngo/verification")
    );
}

#[test]
fn test_ngo_prefix_is_segment_aligned() {
    let routes = RouteTable::default();
    assert_eq!(routes.classify("/ngos"), RouteClass::OtherAuthenticated);
    assert_eq!(routes.classify("/ngo"), RouteClass::NgoGeneral);
    assert!(!routes.guards("/ngos"));
}

// --- Everything else ---

#[test]
fn test_other_routes_allow_any_identity() {
    let gate = gate();
    for caller in [donor(), admin(), ngo(VerificationStatus::Pending)] {
        assert_eq!(gate.evaluate(Some(&caller), "/donations"), GateDecision::Allow);
    }
    assert_eq!(gate.evaluate(None, "/donations"), GateDecision::Unauthorized);
}

#[test]
fn test_guard_scope_covers_admin_and_ngo_only() {
    let routes = RouteTable::default();
    assert!(routes.guards("/admin"));
    assert!(routes.guards("/ngo/login"));
    assert!(routes.guards("/ngo/campaigns/abc"));
    assert!(!routes.guards("/campaigns"));
    assert!(!routes.guards("/donor/donations"));
    assert!(!routes.guards("/"));
}

#[test]
fn test_custom_route_table() {
    let routes = RouteTable {
        public: vec!["/org/signin".to_string()],
        admin_prefix: "/staff".to_string(),
        ngo_prefix: "/org".to_string(),
        admin_login: "/staff/signin".to_string(),
        ngo_verification: "/org/verify".to_string(),
        home: "/welcome".to_string(),
    };
    let gate = AccessGate::new(routes, "ops@example.org");

    assert_eq!(gate.admin_email(), "ops@example.org");
    assert_eq!(gate.evaluate(None, "/org/signin"), GateDecision::Allow);
    assert_eq!(
        gate.evaluate(Some(&donor()), "/staff/queue"),
        redirect("/staff/signin")
    );
    assert_eq!(gate.evaluate(Some(&donor()), "/org/home"), redirect("/welcome"));
    assert_eq!(
        gate.evaluate(Some(&ngo(VerificationStatus::Pending)), "/org/home"),
        redirect("/org/verify")
    );
    // The default tables' paths mean nothing here.
    assert_eq!(gate.evaluate(Some(&donor()), "/admin"), GateDecision::Allow);
}

#[test]
fn test_evaluation_is_repeatable() {
    let gate = gate();
    let caller = ngo(VerificationStatus::Pending);
    let first = gate.evaluate(Some(&caller), "/ngo/dashboard");
    for _ in 0..3 {
        assert_eq!(gate.evaluate(Some(&caller), "/ngo/dashboard"), first);
    }
}
