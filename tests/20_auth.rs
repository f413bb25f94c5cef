mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client")
}

async fn signup(base_url: &str, client: &reqwest::Client, email: &str) -> Result<Value> {
    let res = client
        .post(format!("{}/auth/signup", base_url))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "Dupont",
            "email": email,
            "password": "Abcd1234!",
            "confirm_password": "Abcd1234!",
            "agency_name": "Ana Agency"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json().await?)
}

#[tokio::test]
async fn signup_verify_login_logout_flow() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let client = cookie_client();
    let email = common::unique_email("ana");

    // Signup creates a free-plan agency with an unverified owner
    let body = signup(&server.base_url, &client, &email).await?;
    assert_eq!(body["data"]["agency"]["plan"], "free");
    assert_eq!(body["data"]["user"]["role"], "owner");
    assert_eq!(body["data"]["user"]["email_verified"], false);
    let verification_token = body["data"]["verification_token"]
        .as_str()
        .expect("verification token")
        .to_string();

    // Login before verification fails closed with the verification flag
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "Abcd1234!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["needs_email_verification"], true);

    // Verify, then login succeeds and sets the auth cookie
    let res = client
        .post(format!("{}/auth/verify-email", server.base_url))
        .json(&json!({ "token": verification_token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "Abcd1234!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], email);
    assert_eq!(body["data"]["is_ephemeral"], false);

    // Logout revokes the session server-side; the JWT alone is no longer
    // enough even though it has not expired
    let res = client
        .post(format!("{}/api/auth/logout", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn invalid_credentials_are_indistinguishable() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let client = cookie_client();
    let email = common::unique_email("uniform");
    let body = signup(&server.base_url, &client, &email).await?;
    let token = body["data"]["verification_token"].as_str().expect("token");
    client
        .post(format!("{}/auth/verify-email", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;

    let wrong_password = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "Wrong1234!" }))
        .send()
        .await?;
    let unknown_email = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": common::unique_email("nobody"), "password": "Abcd1234!" }))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Same body for both failure modes
    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_email.json().await?;
    assert_eq!(a, b);

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/team", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn weak_signup_password_is_rejected_with_field_detail() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "Dupont",
            "email": common::unique_email("weak"),
            "password": "abcd1234",
            "confirm_password": "abcd1234",
            "agency_name": "Ana Agency"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["password"].is_string());

    Ok(())
}

#[tokio::test]
async fn team_management_scopes_to_the_callers_agency() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    // Two independent agencies
    let owner_a = cookie_client();
    let owner_b = cookie_client();
    let email_a = common::unique_email("owner-a");
    let email_b = common::unique_email("owner-b");

    for (client, email) in [(&owner_a, &email_a), (&owner_b, &email_b)] {
        let body = signup(&server.base_url, client, email).await?;
        let token = body["data"]["verification_token"].as_str().expect("token");
        client
            .post(format!("{}/auth/verify-email", server.base_url))
            .json(&json!({ "token": token }))
            .send()
            .await?;
        let res = client
            .post(format!("{}/auth/login", server.base_url))
            .json(&json!({ "email": email, "password": "Abcd1234!" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Owner A provisions a teammate with a generated password
    let res = owner_a
        .post(format!("{}/api/team", server.base_url))
        .json(&json!({
            "first_name": "Mia",
            "last_name": "Lee",
            "email": common::unique_email("mia"),
            "role": "member"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let teammate_id = body["data"]["user"]["id"].as_str().expect("id").to_string();
    assert!(body["data"]["generated_password"].is_string());

    // Owner B cannot see or delete A's teammate, even by direct id guess
    let res = owner_b
        .delete(format!("{}/api/team/{}", server.base_url, teammate_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = owner_b
        .get(format!("{}/api/team", server.base_url))
        .send()
        .await?;
    let body: Value = res.json().await?;
    let members = body["data"]["members"].as_array().expect("members");
    assert!(members.iter().all(|m| m["id"] != teammate_id.as_str()));

    // Owner A can
    let res = owner_a
        .delete(format!("{}/api/team/{}", server.base_url, teammate_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deactivated_account_loses_access_mid_session() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let client = cookie_client();
    let email = common::unique_email("soon-gone");

    let body = signup(&server.base_url, &client, &email).await?;
    let owner_id = body["data"]["user"]["id"].as_str().expect("id").to_string();
    let token = body["data"]["verification_token"].as_str().expect("token");
    client
        .post(format!("{}/auth/verify-email", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "Abcd1234!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Owners removed through the team endpoint are deactivated, not
    // deleted; removing oneself is the simplest way to flip the flag
    let res = client
        .delete(format!("{}/api/team/{}", server.base_url, owner_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The JWT is unexpired and the session row still exists, but the
    // account check runs on every request
    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Logging back in is also closed off
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "Abcd1234!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_signup_is_a_conflict() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let client = reqwest::Client::new();
    let email = common::unique_email("twice");

    signup(&server.base_url, &client, &email).await?;

    let res = client
        .post(format!("{}/auth/signup", server.base_url))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "Dupont",
            "email": email,
            "password": "Abcd1234!",
            "confirm_password": "Abcd1234!",
            "agency_name": "Second Agency"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "CONFLICT");

    Ok(())
}

#[tokio::test]
async fn member_role_is_rejected_from_owner_surface() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let owner = cookie_client();
    let owner_email = common::unique_email("owner");
    let body = signup(&server.base_url, &owner, &owner_email).await?;
    let token = body["data"]["verification_token"].as_str().expect("token");
    owner
        .post(format!("{}/auth/verify-email", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    owner
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": owner_email, "password": "Abcd1234!" }))
        .send()
        .await?;

    // Provision a member with a known password, then act as them
    let member_email = common::unique_email("member");
    let res = owner
        .post(format!("{}/api/team", server.base_url))
        .json(&json!({
            "first_name": "Mia",
            "last_name": "Lee",
            "email": member_email,
            "role": "member",
            "password": "Efgh5678!"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let member = cookie_client();
    let res = member
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": member_email, "password": "Efgh5678!" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = member
        .get(format!("{}/api/team", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["your_role"], "member");
    assert_eq!(body["required_roles"][0], "owner");

    Ok(())
}

#[tokio::test]
async fn owner_role_cannot_be_provisioned_as_teammate() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await? {
        return Ok(());
    }

    let owner = cookie_client();
    let owner_email = common::unique_email("sole-owner");
    let body = signup(&server.base_url, &owner, &owner_email).await?;
    let token = body["data"]["verification_token"].as_str().expect("token");
    owner
        .post(format!("{}/auth/verify-email", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;
    owner
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": owner_email, "password": "Abcd1234!" }))
        .send()
        .await?;

    let res = owner
        .post(format!("{}/api/team", server.base_url))
        .json(&json!({
            "first_name": "Eve",
            "last_name": "Lee",
            "email": common::unique_email("eve"),
            "role": "owner"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["role"].is_string());

    Ok(())
}
