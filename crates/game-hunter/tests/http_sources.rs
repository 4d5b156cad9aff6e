//! Storefront and encyclopedia hunters against mocked sites.

use game_hunter::{
    build_hunters, Endpoints, FetchClient, HuntContext, InfoField, InfoValue, NoopBrowser, Source,
    SourceRecord,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERIES_PAGE: &str = r#"<html><body>
    <table class="infobox hproduct"><tr><th>Hollow Knight</th></tr></table>
    <table class="release-timeline">
      <tr><th>2017</th><td><i><a href="/wiki/Hollow_Knight">Hollow Knight</a></i></td></tr>
      <tr><th>2025</th><td><i><a href="/wiki/Hollow_Knight_Silksong">Hollow Knight: Silksong</a></i></td></tr>
    </table></body></html>"#;

const ARTICLE: &str = r#"<html><body><h1 id="firstHeading">Hollow Knight</h1>
    <table class="infobox ib-video-game">
      <tr><th colspan="2">Hollow Knight</th></tr>
      <tr><td colspan="2"><img class="mw-file-element" src="//upload.example/hk.png"></td></tr>
      <tr><th>Developer(s)</th><td>Team Cherry</td></tr>
      <tr><th>Platform(s)</th><td><div class="plainlist"><ul><li>Windows</li><li>Switch</li></ul></div></td></tr>
      <tr><th>Release</th><td>February 24, 2017</td></tr>
    </table></body></html>"#;

fn context() -> HuntContext {
    let mut ctx = HuntContext::new(
        FetchClient::new(&Default::default(), Duration::from_secs(5)),
        Arc::new(NoopBrowser),
    );
    ctx.settle = Duration::ZERO;
    ctx.element_timeout = Duration::from_millis(200);
    ctx
}

fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints {
        storefront: server.uri(),
        search_engine: server.uri(),
        aggregator: server.uri(),
        encyclopedia: server.uri(),
    }
}

async fn html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_encyclopedia_follows_series_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .and(query_param("search", "Hollow Knight"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SERIES_PAGE))
        .mount(&server)
        .await;
    html(&server, "/wiki/Hollow_Knight", ARTICLE).await;

    let hunters = build_hunters(&[Source::Encyclopedia], &context(), &endpoints(&server));
    match hunters[0].hunt("Hollow Knight").await {
        SourceRecord::Encyclopedia(r) => {
            assert!(r.found);
            assert_eq!(r.url, format!("{}/wiki/Hollow_Knight", server.uri()));
            assert_eq!(
                r.field(InfoField::Developers),
                Some(&InfoValue::Text("Team Cherry".to_string()))
            );
            assert_eq!(
                r.field(InfoField::Platforms),
                Some(&InfoValue::List(vec!["Windows".to_string(), "Switch".to_string()]))
            );
            assert_eq!(r.image_url.as_deref(), Some("https://upload.example/hk.png"));
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[tokio::test]
async fn test_encyclopedia_follows_disambiguation_to_series() {
    let server = MockServer::start().await;
    let disambiguation = r#"<html><body><h2 id="Most_commonly">Most commonly</h2><ul>
        <li><a href="/wiki/Knight">Knight</a>, a mounted warrior</li>
        <li><a href="/wiki/Hollow_Knight_series">Hollow Knight</a>, a video game series</li>
        </ul></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(disambiguation))
        .mount(&server)
        .await;
    html(&server, "/wiki/Hollow_Knight_series", SERIES_PAGE).await;
    html(&server, "/wiki/Hollow_Knight", ARTICLE).await;

    let hunters = build_hunters(&[Source::Encyclopedia], &context(), &endpoints(&server));
    let record = hunters[0].hunt("Hollow Knight").await;
    assert!(record.found());
    assert_eq!(record.title(), "Hollow Knight");
}

#[tokio::test]
async fn test_encyclopedia_missing_article() {
    let server = MockServer::start().await;
    let missing = r#"<html><body><p class="mw-search-createlink">The page "Zzyzx Quest" does not exist.</p></body></html>"#;
    html(&server, "/w/index.php", missing).await;

    let hunters = build_hunters(&[Source::Encyclopedia], &context(), &endpoints(&server));
    let record = hunters[0].hunt("Zzyzx Quest").await;
    assert_eq!(record, SourceRecord::not_found(Source::Encyclopedia));
}

#[tokio::test]
async fn test_storefront_search_then_extract() {
    let server = MockServer::start().await;
    let results = format!(
        r#"<html><body><div id="search_results">
        <a class="search_result_row" href="{uri}/app/1/Hollow_Bones/?snr=1_7_7"><span class="title">Skull and Bones</span></a>
        <a class="search_result_row" href="{uri}/app/367520/Hollow_Knight/?snr=1_7_7"><span class="title">Hollow Knight</span></a>
        </div></body></html>"#,
        uri = server.uri()
    );
    let product = r#"<html><body>
        <div id="appHubAppName">Hollow Knight</div>
        <span class="game_review_summary positive" data-tooltip-html="97% of the 234,567 user reviews for this game are positive.">Overwhelmingly Positive</span>
        <span class="responsive_reviewdesc">- 97% of the 234,567 user reviews for this game are positive.</span>
        <div class="date">24 Feb, 2017</div>
        </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("term", "Hollow Knight"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results))
        .mount(&server)
        .await;
    html(&server, "/app/367520/Hollow_Knight/", product).await;

    let hunters = build_hunters(&[Source::Storefront], &context(), &endpoints(&server));
    match hunters[0].hunt("Hollow Knight").await {
        SourceRecord::Storefront(r) => {
            assert!(r.found);
            assert_eq!(r.url, format!("{}/app/367520/Hollow_Knight/", server.uri()));
            assert_eq!(r.all_reviews.text, "Overwhelmingly Positive");
            assert_eq!(r.all_reviews.score, 97);
            assert_eq!(r.release_date, "24 Feb, 2017");
            assert_eq!(r.image_url, "NO IMAGE URL FOUND");
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[tokio::test]
async fn test_storefront_miss_without_browser_is_not_found() {
    let server = MockServer::start().await;
    html(
        &server,
        "/search/",
        r#"<html><body><div id="search_results"></div></body></html>"#,
    )
    .await;

    let hunters = build_hunters(&[Source::Storefront], &context(), &endpoints(&server));
    let record = hunters[0].hunt("Zzyzx Quest").await;
    assert_eq!(record, SourceRecord::not_found(Source::Storefront));
}
