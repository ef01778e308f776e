// Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use certinventory::api::{ApiConfig, ApiServer, AppState};
use certinventory::environment::MapEnvironment;
use certinventory::stores::{StoreConfig, StoreLocation, StoreName};
use openssl::asn1::{Asn1Integer, Asn1Time};
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509, X509Builder, X509Name, X509NameBuilder};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestCert {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl TestCert {
    pub fn thumbprint(&self) -> String {
        hex::encode_upper(self.cert.digest(MessageDigest::sha1()).unwrap())
    }

    pub fn der_base64(&self) -> String {
        STANDARD.encode(self.cert.to_der().unwrap())
    }

    pub fn pkcs12_base64(&self, friendly_name: &str, password: &str) -> String {
        let mut builder = Pkcs12::builder();
        builder.name(friendly_name);
        builder.pkey(&self.key);
        builder.cert(&self.cert);
        STANDARD.encode(builder.build2(password).unwrap().to_der().unwrap())
    }
}

const DAY: i64 = 86_400;

fn new_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn name(cn: &str) -> X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_text("O", "Integration Org").unwrap();
    builder.append_entry_by_text("CN", cn).unwrap();
    builder.build()
}

fn builder(cn: &str, key: &PKey<Private>, from_days: i64, until_days: i64) -> X509Builder {
    let now = chrono::Utc::now().timestamp();
    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    let serial: Asn1Integer = serial.to_asn1_integer().unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name(cn)).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(now + from_days * DAY).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(now + until_days * DAY).unwrap())
        .unwrap();
    builder
}

pub fn self_signed(cn: &str, from_days: i64, until_days: i64) -> TestCert {
    let key = new_key();
    let mut builder = builder(cn, &key, from_days, until_days);
    builder.set_issuer_name(&name(cn)).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    TestCert { cert: builder.build(), key }
}

pub fn authority(cn: &str) -> TestCert {
    let key = new_key();
    let mut builder = builder(cn, &key, -1, 3650);
    builder.set_issuer_name(&name(cn)).unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    TestCert { cert: builder.build(), key }
}

pub fn issued_by(cn: &str, issuer: &TestCert, from_days: i64, until_days: i64) -> TestCert {
    let key = new_key();
    let mut builder = builder(cn, &key, from_days, until_days);
    builder.set_issuer_name(issuer.cert.subject_name()).unwrap();
    builder.sign(&issuer.key, MessageDigest::sha256()).unwrap();
    TestCert { cert: builder.build(), key }
}

/// Application wired to stores under a temporary directory
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(MapEnvironment::new().with_hostname("test-host"), |_| {})
    }

    pub fn with(environment: MapEnvironment, customize: impl FnOnce(&mut ApiConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ApiConfig::default();
        config.stores = StoreLocation::all()
            .into_iter()
            .flat_map(|location| StoreName::all().into_iter().map(move |name| (location, name)))
            .map(|(location, name)| {
                let path = dir.path().join(format!("{}-{}", location.as_str(), name.as_str()));
                StoreConfig::new(location, name, path)
            })
            .collect();
        config.validation.use_system_trust = false;
        customize(&mut config);

        let state = Arc::new(AppState::with_environment(config, Arc::new(environment)).unwrap());
        let router = ApiServer::with_state(Arc::clone(&state)).unwrap().build_router();

        Self { router, state, dir }
    }

    pub fn store_dir(&self, location: StoreLocation, name: StoreName) -> PathBuf {
        let path = self
            .dir
            .path()
            .join(format!("{}-{}", location.as_str(), name.as_str()));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn put_pem(&self, location: StoreLocation, name: StoreName, file: &str, cert: &TestCert) {
        let dir = self.store_dir(location, name);
        write_file(&dir, file, &cert.cert.to_pem().unwrap());
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.raw(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn write_file(dir: &Path, file: &str, contents: &[u8]) {
    std::fs::write(dir.join(file), contents).unwrap();
}
