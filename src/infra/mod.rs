//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for repository access
//! - Image transcoding for uploaded assets
//! - SMTP transport for connection probes

pub mod db;
pub mod mailer;
pub mod media;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mailer::{LettreMailer, MailerError, SmtpProbe};
pub use media::{Encoding, ImageTranscoder, TranscodeError, Transcoder};
pub use repositories::{ConfigRepository, ConfigStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockSmtpProbe;
#[cfg(any(test, feature = "test-utils"))]
pub use media::MockTranscoder;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockConfigRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::StaticUnitOfWork;
