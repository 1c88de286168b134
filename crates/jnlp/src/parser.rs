//! Streaming extraction of a [`JnlpFile`] from descriptor XML.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;
use url::Url;

use crate::model::{ApplicationDesc, J2se, JarDownload, JarResource, JnlpFile, Property};
use crate::JnlpError;

impl JnlpFile {
    /// Parse descriptor XML fetched from `source`
    ///
    /// A relative codebase is resolved against `source`, and a missing one
    /// falls back to the directory `source` lives in.
    pub fn parse(xml: &str, source: Option<&Url>) -> Result<JnlpFile, JnlpError> {
        let mut reader = Reader::from_str(xml);
        let mut state = ParseState::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    state.open(&e)?;
                    state.stack.push(local_name(&e));
                }
                Event::Empty(e) => {
                    state.open(&e)?;
                    if local_name(&e) == "argument" {
                        state.close_argument();
                    }
                }
                Event::Text(e) => {
                    if let Some(text) = state.argument.as_mut() {
                        text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(text) = state.argument.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => {
                    if e.local_name().as_ref() == b"argument" {
                        state.close_argument();
                    }
                    state.stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        state.finish(source)
    }
}

#[derive(Default)]
struct ParseState {
    /// Names of the currently open elements
    stack: Vec<String>,
    seen_root: bool,
    codebase: Option<String>,
    jars: Vec<JarResource>,
    properties: Vec<Property>,
    j2se: Option<J2se>,
    application: Option<ApplicationDesc>,
    /// Text of the `<argument>` being read
    argument: Option<String>,
}

impl ParseState {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), JnlpError> {
        let name = local_name(e);

        if self.stack.is_empty() {
            if name != "jnlp" {
                return Err(JnlpError::MissingElement("jnlp"));
            }
            self.seen_root = true;
            self.codebase = attr(e, "codebase")?.filter(|cb| !cb.trim().is_empty());
            return Ok(());
        }

        match (self.parent(), name.as_str()) {
            (Some("resources"), "jar") => {
                let href = attr(e, "href")?.ok_or(JnlpError::MissingAttribute {
                    element: "jar",
                    attribute: "href",
                })?;
                self.jars.push(JarResource {
                    href,
                    main: attr(e, "main")?.as_deref() == Some("true"),
                    download: attr(e, "download")?
                        .as_deref()
                        .map(JarDownload::from_attr)
                        .unwrap_or_default(),
                });
            }
            (Some("resources"), "property") => {
                let name = attr(e, "name")?.ok_or(JnlpError::MissingAttribute {
                    element: "property",
                    attribute: "name",
                })?;
                self.properties.push(Property {
                    name,
                    value: attr(e, "value")?.unwrap_or_default(),
                });
            }
            (Some("resources"), "j2se" | "java") if self.j2se.is_none() => {
                self.j2se = Some(J2se {
                    version: attr(e, "version")?,
                    href: attr(e, "href")?,
                    initial_heap_size: attr(e, "initial-heap-size")?,
                    max_heap_size: attr(e, "max-heap-size")?,
                    java_vm_args: attr(e, "java-vm-args")?,
                });
            }
            (Some("jnlp"), "application-desc") => {
                let main_class =
                    attr(e, "main-class")?.ok_or(JnlpError::MissingAttribute {
                        element: "application-desc",
                        attribute: "main-class",
                    })?;
                self.application = Some(ApplicationDesc {
                    main_class,
                    arguments: Vec::new(),
                });
            }
            (Some("application-desc"), "argument") => {
                self.argument = Some(String::new());
            }
            _ => {}
        }

        Ok(())
    }

    fn close_argument(&mut self) {
        if let (Some(text), Some(application)) = (self.argument.take(), self.application.as_mut())
        {
            application.arguments.push(text.trim().to_string());
        }
    }

    fn finish(self, source: Option<&Url>) -> Result<JnlpFile, JnlpError> {
        if !self.seen_root {
            return Err(JnlpError::MissingElement("jnlp"));
        }
        let application = self
            .application
            .ok_or(JnlpError::MissingElement("application-desc"))?;
        let codebase = resolve_codebase(self.codebase.as_deref(), source)?;

        debug!(
            codebase = %codebase,
            jars = self.jars.len(),
            properties = self.properties.len(),
            main_class = %application.main_class,
            "Parsed descriptor"
        );

        Ok(JnlpFile {
            codebase,
            jars: self.jars,
            properties: self.properties,
            j2se: self.j2se,
            application,
        })
    }
}

fn resolve_codebase(codebase: Option<&str>, source: Option<&Url>) -> Result<Url, JnlpError> {
    let (value, resolved) = match (codebase, source) {
        (Some(codebase), Some(source)) => (codebase, source.join(codebase)),
        (Some(codebase), None) => (codebase, Url::parse(codebase)),
        (None, Some(source)) => (source.as_str(), source.join(".")),
        (None, None) => return Err(JnlpError::MissingCodebase),
    };

    let mut url = resolved.map_err(|source| JnlpError::InvalidUrl {
        value: value.to_string(),
        source,
    })?;

    // Hrefs resolve inside the codebase, not next to it
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, JnlpError> {
    match e.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<jnlp spec="1.0+" codebase="https://apps.example.org/viewer" href="viewer.jnlp">
  <information>
    <title>Viewer</title>
  </information>
  <resources>
    <j2se version="1.8+" href="http://java.sun.com/products/autodl/j2se"
          initial-heap-size="64m" max-heap-size="512m" java-vm-args="-ea -Dswing.aatext=true"/>
    <jar href="lib/viewer.jar" main="true"/>
    <jar href="lib/help.jar" download="lazy"/>
    <jar href="https://cdn.example.net:8443/shared/commons.jar" download="progress"/>
    <property name="viewer.mode" value="a &amp; b"/>
  </resources>
  <resources os="Windows">
    <java version="11+" max-heap-size="1g"/>
    <jar href="lib/win32.jar"/>
    <property name="viewer.native" value="true"/>
  </resources>
  <application-desc main-class="org.example.Viewer">
    <argument>--server</argument>
    <argument>https://apps.example.org/?a=1&amp;b=2</argument>
    <argument/>
  </application-desc>
</jnlp>
"#;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full_descriptor() {
        let jnlp = JnlpFile::parse(DESCRIPTOR, None).unwrap();

        assert_eq!(jnlp.codebase, url("https://apps.example.org/viewer/"));
        assert_eq!(
            jnlp.jars,
            vec![
                JarResource {
                    href: "lib/viewer.jar".into(),
                    main: true,
                    download: JarDownload::Eager,
                },
                JarResource {
                    href: "lib/help.jar".into(),
                    main: false,
                    download: JarDownload::Lazy,
                },
                JarResource {
                    href: "https://cdn.example.net:8443/shared/commons.jar".into(),
                    main: false,
                    download: JarDownload::Progress,
                },
                JarResource {
                    href: "lib/win32.jar".into(),
                    main: false,
                    download: JarDownload::Eager,
                },
            ]
        );
        assert_eq!(
            jnlp.properties,
            vec![
                Property {
                    name: "viewer.mode".into(),
                    value: "a & b".into(),
                },
                Property {
                    name: "viewer.native".into(),
                    value: "true".into(),
                },
            ]
        );

        let j2se = jnlp.j2se.as_ref().unwrap();
        assert_eq!(j2se.version.as_deref(), Some("1.8+"));
        assert_eq!(j2se.initial_heap_size.as_deref(), Some("64m"));
        assert_eq!(j2se.max_heap_size.as_deref(), Some("512m"));
        assert_eq!(
            j2se.vm_args().collect::<Vec<_>>(),
            vec!["-ea", "-Dswing.aatext=true"]
        );

        assert_eq!(jnlp.application.main_class, "org.example.Viewer");
        assert_eq!(
            jnlp.application.arguments,
            vec!["--server", "https://apps.example.org/?a=1&b=2", ""]
        );
    }

    #[test]
    fn test_jar_urls_resolve_inside_codebase() {
        let jnlp = JnlpFile::parse(DESCRIPTOR, None).unwrap();

        assert_eq!(
            jnlp.jar_url(&jnlp.jars[0]).unwrap(),
            url("https://apps.example.org/viewer/lib/viewer.jar")
        );
        assert_eq!(
            jnlp.jar_url(&jnlp.jars[2]).unwrap(),
            url("https://cdn.example.net:8443/shared/commons.jar")
        );
    }

    #[test]
    fn test_relative_codebase_uses_source() {
        let xml = r#"<jnlp codebase="apps/"><application-desc main-class="Main"/></jnlp>"#;
        let source = url("http://intranet.local/launch/start.jnlp");

        let jnlp = JnlpFile::parse(xml, Some(&source)).unwrap();
        assert_eq!(jnlp.codebase, url("http://intranet.local/launch/apps/"));
    }

    #[test]
    fn test_missing_codebase_falls_back_to_source_directory() {
        let xml = r#"<jnlp><resources><jar href="a.jar"/></resources>
            <application-desc main-class="Main"></application-desc></jnlp>"#;
        let source = url("http://intranet.local/launch/start.jnlp");

        let jnlp = JnlpFile::parse(xml, Some(&source)).unwrap();
        assert_eq!(jnlp.codebase, url("http://intranet.local/launch/"));
        assert_eq!(
            jnlp.jar_url(&jnlp.jars[0]).unwrap(),
            url("http://intranet.local/launch/a.jar")
        );
        assert!(jnlp.j2se.is_none());
        assert!(jnlp.application.arguments.is_empty());
    }

    #[test]
    fn test_missing_codebase_without_source() {
        let xml = r#"<jnlp><application-desc main-class="Main"/></jnlp>"#;
        assert!(matches!(
            JnlpFile::parse(xml, None),
            Err(JnlpError::MissingCodebase)
        ));
    }

    #[test]
    fn test_missing_pieces_are_reported() {
        let no_app = r#"<jnlp codebase="http://h/"><resources/></jnlp>"#;
        assert!(matches!(
            JnlpFile::parse(no_app, None),
            Err(JnlpError::MissingElement("application-desc"))
        ));

        let no_href = r#"<jnlp codebase="http://h/"><resources><jar main="true"/></resources>
            <application-desc main-class="Main"/></jnlp>"#;
        assert!(matches!(
            JnlpFile::parse(no_href, None),
            Err(JnlpError::MissingAttribute {
                element: "jar",
                attribute: "href"
            })
        ));

        let wrong_root = r#"<html><body/></html>"#;
        assert!(matches!(
            JnlpFile::parse(wrong_root, None),
            Err(JnlpError::MissingElement("jnlp"))
        ));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = r#"<jnlp codebase="http://h/"><resources></jnlp>"#;
        assert!(matches!(JnlpFile::parse(xml, None), Err(JnlpError::Xml(_))));
    }

    #[test]
    fn test_jars_outside_resources_are_ignored() {
        let xml = r#"<jnlp codebase="http://h/">
            <information><jar href="bogus.jar"/></information>
            <resources><jar href="real.jar"/></resources>
            <application-desc main-class="Main"/></jnlp>"#;

        let jnlp = JnlpFile::parse(xml, None).unwrap();
        assert_eq!(jnlp.jars.len(), 1);
        assert_eq!(jnlp.jars[0].href, "real.jar");
    }
}
