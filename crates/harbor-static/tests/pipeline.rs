//! Behaviour of the standard pipeline against a real document root.

use std::fs;

use harbor_core::StaticFilesConfig;
use harbor_core::config::CacheControlRule;
use harbor_static::{ByteRange, EntityTag, ResourceDecision, ResourceRequest, StaticSite};
use http::Method;
use http::header::{
    ACCEPT_ENCODING, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE, ETAG,
    IF_NONE_MATCH, LAST_MODIFIED, RANGE, VARY,
};
use tempfile::TempDir;

struct Site {
    dir: TempDir,
    site: StaticSite,
}

fn site_with(configure: impl FnOnce(&mut StaticFilesConfig)) -> Site {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.bin"), vec![7u8; 500]).unwrap();
    fs::write(dir.path().join("style.css"), "body { color: red; }\n".repeat(200)).unwrap();
    fs::create_dir(dir.path().join("img")).unwrap();
    fs::write(dir.path().join("img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(dir.path().join("index.php"), "<?php").unwrap();

    let mut config = StaticFilesConfig::serving(dir.path());
    configure(&mut config);
    let site = StaticSite::from_config(&config).unwrap();
    Site { dir, site }
}

fn site() -> Site {
    site_with(|config| config.fallthrough_on_missing = false)
}

fn etag_of(site: &Site, url: &str) -> String {
    let resolution = site.site.resolve(&ResourceRequest::get(url));
    resolution.decision.headers().unwrap()[ETAG]
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn missing_path_is_not_found_regardless_of_headers() {
    let site = site();
    for request in [
        ResourceRequest::get("/nope.css"),
        ResourceRequest::head("/nope.css"),
        ResourceRequest::get("/nope.css").with_header(RANGE, "bytes=0-10"),
        ResourceRequest::get("/nope.css").with_header(IF_NONE_MATCH, "*"),
        ResourceRequest::new(Method::POST, "/nope.css"),
    ] {
        assert_eq!(site.site.resolve(&request).decision, ResourceDecision::NotFound);
    }
}

#[test]
fn directory_is_not_found() {
    let site = site();
    assert_eq!(
        site.site.resolve(&ResourceRequest::get("/img")).decision,
        ResourceDecision::NotFound
    );
}

#[test]
fn full_content_is_stamped() {
    let site = site();
    let resolution = site.site.resolve(&ResourceRequest::get("/data.bin"));
    let ResourceDecision::FullContent { headers, source } = &resolution.decision else {
        panic!("expected full content, got {:?}", resolution.decision);
    };

    assert_eq!(headers[CONTENT_LENGTH], "500");
    assert_eq!(headers[CACHE_CONTROL], "no-cache");
    assert!(headers.contains_key(LAST_MODIFIED));
    assert!(headers.contains_key(ETAG));
    assert_eq!(source.size(), 500);
    assert!(source.include_body());
}

#[test]
fn matching_if_none_match_is_not_modified_for_get_and_head() {
    let site = site();
    let etag = etag_of(&site, "/data.bin");

    for method in [Method::GET, Method::HEAD] {
        let request = ResourceRequest::new(method, "/data.bin").with_header(IF_NONE_MATCH, &etag);
        let decision = site.site.resolve(&request).decision;
        let ResourceDecision::NotModified { headers } = &decision else {
            panic!("expected 304, got {decision:?}");
        };
        assert_eq!(headers[ETAG], etag.as_str());
        assert!(decision.source().is_none());
    }
}

#[test]
fn first_hundred_bytes_of_five_hundred() {
    let site = site();
    let request = ResourceRequest::get("/data.bin").with_header(RANGE, "bytes=0-99");
    let decision = site.site.resolve(&request).decision;

    let ResourceDecision::PartialContent { ranges, headers, .. } = &decision else {
        panic!("expected 206, got {decision:?}");
    };
    assert_eq!(ranges, &[ByteRange { start: 0, end: 99 }]);
    assert_eq!(headers[CONTENT_RANGE], "bytes 0-99/500");
    assert!(headers.contains_key(ETAG));
}

#[test]
fn range_past_end_is_not_satisfiable() {
    let site = site();
    let request = ResourceRequest::get("/data.bin").with_header(RANGE, "bytes=1000-");
    let decision = site.site.resolve(&request).decision;

    let ResourceDecision::RangeNotSatisfiable { headers } = &decision else {
        panic!("expected 416, got {decision:?}");
    };
    assert_eq!(headers[CONTENT_RANGE], "bytes */500");
}

#[test]
fn traversal_outside_root_is_not_found() {
    let site = site_with(|_| {});
    for url in ["/../harbor-secret.txt", "/%2e%2e/harbor-secret.txt", "/img/../../etc/passwd"] {
        assert_eq!(
            site.site.resolve(&ResourceRequest::get(url)).decision,
            ResourceDecision::NotFound,
            "{url}"
        );
    }
}

#[cfg(unix)]
#[test]
fn symlink_outside_root_is_not_found() {
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("secret.txt"), "secret").unwrap();

    let site = site_with(|_| {});
    std::os::unix::fs::symlink(outside.path(), site.dir.path().join("linked")).unwrap();

    assert_eq!(
        site.site.resolve(&ResourceRequest::get("/linked/secret.txt")).decision,
        ResourceDecision::NotFound
    );
}

#[test]
fn missing_file_falls_through_when_enabled() {
    let site = site_with(|_| {});
    assert_eq!(
        site.site.resolve(&ResourceRequest::get("/api/users")).decision,
        ResourceDecision::Decline
    );
}

#[test]
fn unknown_extension_and_post_are_declined() {
    let site = site();
    assert_eq!(
        site.site.resolve(&ResourceRequest::get("/index.php")).decision,
        ResourceDecision::Decline
    );
    assert_eq!(
        site.site
            .resolve(&ResourceRequest::new(Method::POST, "/style.css"))
            .decision,
        ResourceDecision::Decline
    );
}

#[test]
fn compression_is_negotiated_but_never_with_ranges() {
    let site = site();

    let request = ResourceRequest::get("/style.css").with_header(ACCEPT_ENCODING, "gzip");
    let decision = site.site.resolve(&request).decision;
    let ResourceDecision::FullContent { headers, source } = &decision else {
        panic!("expected 200, got {decision:?}");
    };
    assert_eq!(headers[CONTENT_ENCODING], "gzip");
    assert!(source.encoding().is_some());

    let request = ResourceRequest::get("/style.css")
        .with_header(ACCEPT_ENCODING, "gzip")
        .with_header(RANGE, "bytes=0-9");
    let decision = site.site.resolve(&request).decision;
    let ResourceDecision::PartialContent { headers, source, .. } = &decision else {
        panic!("expected 206, got {decision:?}");
    };
    assert!(headers.get(CONTENT_ENCODING).is_none());
    assert!(source.encoding().is_none());
}

#[test]
fn compressible_file_varies_on_every_stamped_decision() {
    let site = site();
    let etag = etag_of(&site, "/style.css");

    let not_modified = ResourceRequest::get("/style.css").with_header(IF_NONE_MATCH, &etag);
    let partial = ResourceRequest::get("/style.css").with_header(RANGE, "bytes=0-9");
    let full = ResourceRequest::get("/style.css").with_header(ACCEPT_ENCODING, "gzip");

    for request in [not_modified, partial, full] {
        let decision = site.site.resolve(&request).decision;
        assert!(
            matches!(
                decision,
                ResourceDecision::NotModified { .. }
                    | ResourceDecision::PartialContent { .. }
                    | ResourceDecision::FullContent { .. }
            ),
            "unexpected {decision:?}"
        );
        assert_eq!(decision.headers().unwrap()[VARY], "accept-encoding");
    }

    let etag = etag_of(&site, "/data.bin");
    let request = ResourceRequest::get("/data.bin").with_header(IF_NONE_MATCH, &etag);
    let decision = site.site.resolve(&request).decision;
    assert!(decision.headers().unwrap().get(VARY).is_none());
}

#[test]
fn cache_rules_pick_directives() {
    let site = site_with(|config| {
        config.cache_control = vec![CacheControlRule::new(r"^/img/", "public, max-age=86400")];
    });
    let decision = site.site.resolve(&ResourceRequest::get("/img/logo.png")).decision;
    assert_eq!(decision.headers().unwrap()[CACHE_CONTROL], "public, max-age=86400");

    let decision = site.site.resolve(&ResourceRequest::get("/data.bin")).decision;
    assert_eq!(decision.headers().unwrap()[CACHE_CONTROL], "no-cache");
}

#[test]
fn etag_changes_when_file_changes() {
    let site = site();
    let before = etag_of(&site, "/data.bin");
    fs::write(site.dir.path().join("data.bin"), vec![1u8; 501]).unwrap();
    let after = etag_of(&site, "/data.bin");
    assert_ne!(before, after);
    assert!(EntityTag::parse(&after).is_some());
}
