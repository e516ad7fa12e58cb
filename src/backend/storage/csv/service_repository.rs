//! CSV-backed service directory.
//!
//! File format:
//! ```csv
//! code,name,fee
//! 598470,Dietitian session,45.00
//! ```

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use csv::Reader;
use log::{debug, info};

use super::connection::CsvConnection;
use crate::backend::domain::models::service::{Service, ServiceCode};
use crate::backend::storage::traits::ServiceStore;

/// The directory shipped with a fresh data directory. Codes and fees are
/// provisioned by the claims office; these are the standing wellness offers.
const DEFAULT_SERVICES: [(u32, &str, f64); 5] = [
    (598470, "Dietitian session", 45.00),
    (883948, "Aerobics class", 35.00),
    (648616, "Physical therapy", 75.00),
    (412006, "Counseling session", 60.00),
    (177250, "Wellness screening", 25.00),
];

#[derive(Clone)]
pub struct ServiceRepository {
    connection: Arc<CsvConnection>,
}

impl ServiceRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Write the default directory if no directory file exists yet.
    pub fn ensure_seeded(&self) -> Result<()> {
        if self.connection.services_file_path().exists() {
            return Ok(());
        }
        info!("Seeding default service directory");
        let mut services = Vec::new();
        for (code, name, fee) in DEFAULT_SERVICES {
            let code = ServiceCode::from_value(code)
                .map_err(|e| anyhow!("Bad default service code: {}", e))?;
            let service = Service::try_new(code, name, fee)
                .map_err(|e| anyhow!("Bad default service entry: {}", e))?;
            services.push(service);
        }
        self.write_services(&services)
    }

    /// Insert or replace a directory entry. Provisioning-side only; the
    /// terminal itself never calls this.
    pub fn put_service(&self, service: &Service) -> Result<()> {
        let mut services = self.read_services()?;
        services.retain(|s| s.code() != service.code());
        services.push(service.clone());
        services.sort_by_key(|s| s.code());
        self.write_services(&services)
    }

    fn read_services(&self) -> Result<Vec<Service>> {
        let path = self.connection.services_file_path();
        if !path.exists() {
            debug!("Service directory file doesn't exist, returning empty list");
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut services = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let code_raw = record.get(0).unwrap_or("");
            let name = record.get(1).unwrap_or("");
            let fee_raw = record.get(2).unwrap_or("");

            let code = ServiceCode::parse(code_raw)
                .map_err(|e| anyhow!("Bad service code in directory: {}", e))?;
            let fee: f64 = fee_raw
                .parse()
                .with_context(|| format!("Bad fee for service {}: {:?}", code, fee_raw))?;
            let service = Service::try_new(code, name, fee)
                .map_err(|e| anyhow!("Service {} failed validation: {}", code, e))?;
            services.push(service);
        }

        Ok(services)
    }

    fn write_services(&self, services: &[Service]) -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut csv_writer = csv::Writer::from_writer(&mut buf);
            csv_writer.write_record(["code", "name", "fee"])?;
            for service in services {
                csv_writer.write_record(&[
                    service.code().to_string(),
                    service.name().to_string(),
                    format!("{:.2}", service.cost()),
                ])?;
            }
            csv_writer.flush()?;
        }
        let contents = String::from_utf8(buf)?;
        self.connection
            .write_atomic(&self.connection.services_file_path(), &contents)
    }
}

impl ServiceStore for ServiceRepository {
    fn get_service(&self, code: ServiceCode) -> Result<Option<Service>> {
        Ok(self.read_services()?.into_iter().find(|s| s.code() == code))
    }

    fn list_services(&self) -> Result<Vec<Service>> {
        let mut services = self.read_services()?;
        services.sort_by_key(|s| s.code());
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (ServiceRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = ServiceRepository::new(Arc::new(connection));
        (repo, temp_dir)
    }

    #[test]
    fn test_seed_then_lookup() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.ensure_seeded().expect("Failed to seed directory");

        let code = ServiceCode::parse("598470").unwrap();
        let service = repo
            .get_service(code)
            .expect("Failed to read directory")
            .expect("Seeded service missing");
        assert_eq!(service.name(), "Dietitian session");
        assert_eq!(service.cost(), 45.00);
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.ensure_seeded().unwrap();
        let custom =
            Service::try_new(ServiceCode::parse("123456").unwrap(), "Yoga class", 20.0).unwrap();
        repo.put_service(&custom).unwrap();

        // A second seeding pass must not clobber the provisioned entry.
        repo.ensure_seeded().unwrap();
        assert!(repo
            .get_service(ServiceCode::parse("123456").unwrap())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_unknown_code_is_none() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.ensure_seeded().unwrap();
        assert!(repo
            .get_service(ServiceCode::parse("999999").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let (repo, _temp_dir) = setup_test_repo();
        let code = ServiceCode::parse("123456").unwrap();
        repo.put_service(&Service::try_new(code, "Yoga class", 20.0).unwrap())
            .unwrap();
        repo.put_service(&Service::try_new(code, "Yoga class", 25.0).unwrap())
            .unwrap();

        let services = repo.list_services().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].cost(), 25.0);
    }
}
