// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Embed URL and permalink construction for Mackerel graphs.
///
/// Query strings are form-encoded with keys in sorted order, which matches
/// the URLs produced by Mackerel's own tooling and keeps output stable.
/// Escaping follows that tooling byte for byte: `~` is left literal while
/// `*` is percent-encoded, the reverse of plain form encoding.
use url::{Url, form_urlencoded};

use crate::{error::Error, graph::GraphSpec};

/// Origin serving both embeds and interactive graph pages.
pub const SERVICE_ORIGIN: &str = "https://mackerel.io";

/// Builds the URL used to display a graph, either as an interactive embed
/// or, when `as_image` is set, as a PNG image.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the identifiers in the graph cannot
/// form a valid URL.
///
/// # Example
///
/// ```
/// use mkr_dashboards::{GraphSpec, embed_url};
///
/// let graph = GraphSpec::Host {
///     host_id:    "2u4PP3TJqbu".to_owned(),
///     graph_name: "loadavg".to_owned(),
///     period:     "1h".to_owned(),
/// };
/// let url = embed_url(&graph, "example", true,).expect("valid url",);
/// assert_eq!(
///     url.as_str(),
///     "https://mackerel.io/embed/orgs/example/hosts/2u4PP3TJqbu.png?graph=loadavg&period=1h"
/// );
/// ```
pub fn embed_url(graph: &GraphSpec, org: &str, as_image: bool,) -> Result<Url, Error,>
{
    let extension = if as_image { ".png" } else { "" };

    let (path, params,) = match graph {
        GraphSpec::Host {
            host_id,
            graph_name,
            period,
        } => (
            format!("hosts/{host_id}"),
            vec![("graph", graph_name.as_str(),), ("period", period.as_str(),)],
        ),
        GraphSpec::Service {
            service_name,
            graph_name,
            period,
        } => (
            format!("services/{service_name}"),
            vec![("graph", graph_name.as_str(),), ("period", period.as_str(),)],
        ),
        GraphSpec::Role {
            service_name,
            role_name,
            graph_name,
            period,
            stacked,
            simplified,
        } => (
            format!("services/{service_name}/{role_name}"),
            vec![
                ("graph", graph_name.as_str(),),
                ("stacked", bool_param(*stacked,),),
                ("simplified", bool_param(*simplified,),),
                ("period", period.as_str(),),
            ],
        ),
        GraphSpec::Expression {
            query,
            title,
            unit,
            period,
        } => (
            "advanced-graph".to_owned(),
            vec![
                ("query", query.as_str(),),
                ("period", period.as_str(),),
                ("title", title.as_str(),),
                ("unit", unit.as_str(),),
            ],
        ),
    };

    build_url(&format!("{SERVICE_ORIGIN}/embed/orgs/{org}/{path}{extension}"), params,)
}

/// Builds the link to the graph's interactive page on Mackerel.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the identifiers in the graph cannot
/// form a valid URL.
pub fn permalink(graph: &GraphSpec, org: &str,) -> Result<Url, Error,>
{
    match graph {
        GraphSpec::Host {
            host_id,
            graph_name,
            ..
        } => {
            let escaped = query_escape(graph_name,);
            build_url(
                &format!("{SERVICE_ORIGIN}/orgs/{org}/hosts/{host_id}/-/graphs/{escaped}"),
                Vec::new(),
            )
        }
        GraphSpec::Service {
            service_name,
            graph_name,
            ..
        } => build_url(
            &format!("{SERVICE_ORIGIN}/orgs/{org}/services/{service_name}/-/graphs"),
            vec![("name", graph_name.as_str(),)],
        ),
        GraphSpec::Role {
            service_name,
            role_name,
            graph_name,
            ..
        } => build_url(
            &format!("{SERVICE_ORIGIN}/orgs/{org}/services/{service_name}/{role_name}/-/graph"),
            vec![("name", graph_name.as_str(),)],
        ),
        GraphSpec::Expression {
            query,
            title,
            unit,
            ..
        } => build_url(
            &format!("{SERVICE_ORIGIN}/orgs/{org}/advanced-graph"),
            vec![("query", query.as_str(),), ("title", title.as_str(),), ("unit", unit.as_str(),)],
        ),
    }
}

fn bool_param(value: bool,) -> &'static str
{
    if value { "true" } else { "false" }
}

fn query_escape(value: &str,) -> String
{
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes(),).collect();
    encoded.replace('*', "%2A",).replace("%7E", "~",)
}

fn build_url(raw: &str, mut params: Vec<(&str, &str,),>,) -> Result<Url, Error,>
{
    let mut url = Url::parse(raw,)
        .map_err(|e| Error::validation(format!("invalid graph url '{raw}': {e}"),),)?;

    if !params.is_empty() {
        params.sort_by_key(|(key, _,)| *key,);
        let query = params
            .iter()
            .map(|(key, value,)| format!("{}={}", query_escape(key,), query_escape(value,)),)
            .collect::<Vec<_,>>()
            .join("&",);
        url.set_query(Some(&query,),);
    }

    Ok(url,)
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn host(graph_name: &str, period: &str,) -> GraphSpec
    {
        GraphSpec::Host {
            host_id:    "2u4PP3TJqbu".to_owned(),
            graph_name: graph_name.to_owned(),
            period:     period.to_owned(),
        }
    }

    fn role(stacked: bool, simplified: bool,) -> GraphSpec
    {
        GraphSpec::Role {
            service_name: "shop".to_owned(),
            role_name: "db".to_owned(),
            graph_name: "loadavg5".to_owned(),
            period: "1h".to_owned(),
            stacked,
            simplified,
        }
    }

    fn expression() -> GraphSpec
    {
        GraphSpec::Expression {
            query:  "avg(roleSlots('shop:db','loadavg5'))".to_owned(),
            title:  "db load".to_owned(),
            unit:   "float".to_owned(),
            period: "30m".to_owned(),
        }
    }

    fn query_map(url: &Url,) -> HashMap<String, String,>
    {
        url.query_pairs().map(|(key, value,)| (key.into_owned(), value.into_owned(),),).collect()
    }

    #[test]
    fn host_embed_url_for_iframe()
    {
        let url = embed_url(&host("cpu", "1h",), "org", false,).expect("valid url",);
        assert_eq!(
            url.as_str(),
            "https://mackerel.io/embed/orgs/org/hosts/2u4PP3TJqbu?graph=cpu&period=1h"
        );
    }

    #[test]
    fn host_permalink_escapes_graph_name_into_path()
    {
        let url = permalink(&host("custom.foo bar", "1h",), "org",).expect("valid url",);
        assert_eq!(url.as_str(), "https://mackerel.io/orgs/org/hosts/2u4PP3TJqbu/-/graphs/custom.foo+bar");
    }

    #[test]
    fn service_urls_use_graph_and_name_keys()
    {
        let graph = GraphSpec::Service {
            service_name: "shop".to_owned(),
            graph_name:   "access_count".to_owned(),
            period:       "6h".to_owned(),
        };

        let embed = embed_url(&graph, "org", true,).expect("valid url",);
        assert_eq!(
            embed.as_str(),
            "https://mackerel.io/embed/orgs/org/services/shop.png?graph=access_count&period=6h"
        );

        let link = permalink(&graph, "org",).expect("valid url",);
        assert_eq!(link.as_str(), "https://mackerel.io/orgs/org/services/shop/-/graphs?name=access_count");
    }

    #[test]
    fn role_embed_url_serializes_flags_as_literals()
    {
        let url = embed_url(&role(true, false,), "org", false,).expect("valid url",);
        assert_eq!(
            url.as_str(),
            "https://mackerel.io/embed/orgs/org/services/shop/db?graph=loadavg5&period=1h&simplified=false&stacked=true"
        );

        let link = permalink(&role(true, false,), "org",).expect("valid url",);
        assert_eq!(link.as_str(), "https://mackerel.io/orgs/org/services/shop/db/-/graph?name=loadavg5");
    }

    #[test]
    fn expression_permalink_omits_period()
    {
        let embed = embed_url(&expression(), "org", false,).expect("valid url",);
        let embed_query = query_map(&embed,);
        assert_eq!(embed.path(), "/embed/orgs/org/advanced-graph");
        assert_eq!(embed_query.get("period").map(String::as_str), Some("30m"));
        assert_eq!(embed_query.get("title").map(String::as_str), Some("db load"));

        let link = permalink(&expression(), "org",).expect("valid url",);
        let link_query = query_map(&link,);
        assert_eq!(link.path(), "/orgs/org/advanced-graph");
        assert!(!link_query.contains_key("period"));
        assert_eq!(
            link_query.get("query").map(String::as_str),
            Some("avg(roleSlots('shop:db','loadavg5'))")
        );
    }

    #[test]
    fn expression_query_is_form_encoded()
    {
        let url = embed_url(&expression(), "org", false,).expect("valid url",);
        let query = url.query().expect("query string",);
        assert!(query.starts_with("period=30m&query=avg%28roleSlots%28%27shop%3Adb%27"));
        assert!(query.contains("title=db+load"));
    }

    #[test]
    fn tilde_is_literal_and_asterisk_is_escaped()
    {
        let url = embed_url(&host("custom.a~b*c", "1h",), "org", false,).expect("valid url",);
        assert_eq!(url.query(), Some("graph=custom.a~b%2Ac&period=1h"));
        assert_eq!(query_map(&url,).get("graph").map(String::as_str), Some("custom.a~b*c"));

        let link = permalink(&host("custom.a~b*c", "1h",), "org",).expect("valid url",);
        assert!(link.path().ends_with("/-/graphs/custom.a~b%2Ac"));
    }

    #[test]
    fn escaped_percent_is_not_mistaken_for_tilde()
    {
        assert_eq!(query_escape("%7E"), "%257E");
    }

    #[test]
    fn png_suffix_applies_to_every_kind()
    {
        let graphs = [
            host("cpu", "1h",),
            GraphSpec::Service {
                service_name: "shop".to_owned(),
                graph_name:   "cpu".to_owned(),
                period:       "1h".to_owned(),
            },
            role(false, true,),
            expression(),
        ];

        for graph in &graphs {
            let image = embed_url(graph, "org", true,).expect("valid url",);
            let iframe = embed_url(graph, "org", false,).expect("valid url",);
            assert!(image.path().ends_with(".png"), "{} image url lacks .png", graph.kind());
            assert!(!iframe.path().ends_with(".png"), "{} iframe url has .png", graph.kind());
        }
    }

    proptest! {
        #[test]
        fn query_values_round_trip(graph_name in "[ -~]{1,32}", period in "[ -~]{1,16}") {
            let graph = host(&graph_name, &period);
            let url = embed_url(&graph, "org", false).expect("valid url");
            let query = query_map(&url);
            prop_assert_eq!(query.get("graph"), Some(&graph_name));
            prop_assert_eq!(query.get("period"), Some(&period));
        }

        #[test]
        fn urls_are_deterministic(graph_name in "[A-Za-z0-9._ &=-]{1,24}", stacked in any::<bool>()) {
            let graph = GraphSpec::Role {
                service_name: "shop".to_owned(),
                role_name: "web".to_owned(),
                graph_name,
                period: "1h".to_owned(),
                stacked,
                simplified: !stacked,
            };
            prop_assert_eq!(embed_url(&graph, "org", true).expect("valid url"), embed_url(&graph, "org", true).expect("valid url"));
            prop_assert_eq!(permalink(&graph, "org").expect("valid url"), permalink(&graph, "org").expect("valid url"));
        }
    }
}
