use clap::Parser;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: std::cell::RefCell<HashMap<String, String>> = std::cell::RefCell::new(HashMap::new());
}

/// Parameters found in a web page query string
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Default, PartialEq)]
pub struct QueryParams {
    /// `cli`-prefixed parameters as command line arguments (`clizoom=9` -> `--zoom 9`)
    pub args: Vec<String>,
    /// `env`-prefixed parameters as environment variables (`envLOG_LEVEL=debug`)
    pub env: Vec<(String, String)>,
}

/// Split the query string of `url` into command line arguments and environment variables
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn parse_query(url: &str) -> QueryParams {
    let mut params = QueryParams::default();
    let Some((_, query)) = url.split_once('?') else {
        return params;
    };
    let query = query.split('#').next().unwrap_or_default();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if let Some(arg_key) = key.strip_prefix("cli") {
            if !arg_key.is_empty() {
                params.args.push(format!("--{}", arg_key));
            }
            if !value.is_empty() {
                params.args.push(value.to_string());
            }
        } else if let Some(env_key) = key.strip_prefix("env")
            && !env_key.is_empty()
        {
            params.env.push((env_key.to_string(), value.to_string()));
        }
    }
    params
}

#[cfg(target_arch = "wasm32")]
fn location_href() -> String {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

/// Generic function to get environment variable, parsing it to the desired type.
#[allow(dead_code)]
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Parses environment variables from GET parameters on web.
#[allow(dead_code)]
pub fn parse_env() {
    #[cfg(target_arch = "wasm32")]
    {
        let params = parse_query(&location_href());
        ENV_MAP.with(|map| map.borrow_mut().extend(params.env));
    }
}

/// Parses from the command line arguments on native and from GET parameters on web.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let mut args = vec!["trail-map-viewer".to_string()];
        args.extend(parse_query(&location_href()).args);
        T::try_parse_from(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = parse_query(
            "https://example.org/map/?cliimages&clizoom=9&envLOG_LEVEL=debug&other=1#top",
        );
        assert_eq!(params.args, vec!["--images", "--zoom", "9"]);
        assert_eq!(
            params.env,
            vec![("LOG_LEVEL".to_string(), "debug".to_string())]
        );
    }

    #[test]
    fn test_parse_query_without_parameters() {
        assert_eq!(parse_query("https://example.org/"), QueryParams::default());
        assert_eq!(parse_query("https://example.org/?"), QueryParams::default());
    }

    #[test]
    fn test_empty_prefixes_are_ignored() {
        let params = parse_query("/?cli=x&env=y");
        assert_eq!(params.args, vec!["x"]);
        assert!(params.env.is_empty());
    }
}
