//! # JNLP descriptors
//!
//! Model of a Java Network Launch Protocol descriptor and a parser that
//! extracts what a launcher needs from it: the codebase, the jar
//! resources, system properties, the requested runtime and the
//! application entry point.
//!
//! ```
//! use jnlp::{JarDownload, JnlpFile};
//!
//! let xml = r#"<jnlp codebase="https://example.org/app">
//!   <resources>
//!     <jar href="main.jar" main="true"/>
//!     <jar href="extra.jar" download="lazy"/>
//!   </resources>
//!   <application-desc main-class="org.example.Main"/>
//! </jnlp>"#;
//!
//! let jnlp = JnlpFile::parse(xml, None).unwrap();
//! assert_eq!(jnlp.jars[1].download, JarDownload::Lazy);
//! assert_eq!(
//!     jnlp.jar_url(&jnlp.jars[0]).unwrap().as_str(),
//!     "https://example.org/app/main.jar"
//! );
//! ```

mod error;
mod model;
mod parser;

pub use error::JnlpError;
pub use model::{ApplicationDesc, J2se, JarDownload, JarResource, JnlpFile, Property};
