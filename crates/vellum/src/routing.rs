use std::path::{Path, PathBuf};

use crate::{errors::BuildError, route::PageParams};

#[derive(Debug, PartialEq)]
pub struct ParameterDef {
    pub(crate) key: String,
    pub(crate) index: usize,
    pub(crate) length: usize,
}

#[derive(PartialEq, Eq, Debug)]
pub enum RouteType {
    Static,
    Dynamic,
}

/// Finds every `[param]` placeholder in a route, ignoring brackets escaped with a backslash.
pub fn extract_params_from_raw_route(raw_route: &str) -> Vec<ParameterDef> {
    let mut params = Vec::new();
    let mut start = 0;

    while let Some(bracket_pos) = raw_route[start..].find('[') {
        let abs_pos = start + bracket_pos;

        let backslash_count = raw_route[..abs_pos]
            .chars()
            .rev()
            .take_while(|&c| c == '\\')
            .count();

        if backslash_count % 2 == 1 {
            start = abs_pos + 1;
            continue;
        }

        if let Some(end_bracket) = raw_route[abs_pos + 1..].find(']') {
            let end_pos = abs_pos + 1 + end_bracket;
            let key = raw_route[abs_pos + 1..end_pos].to_string();

            params.push(ParameterDef {
                key,
                index: abs_pos,
                length: end_pos - abs_pos + 1,
            });

            start = end_pos + 1;
        } else {
            break;
        }
    }

    params
}

pub fn get_route_type_from_route_params(params_def: &[ParameterDef]) -> RouteType {
    if params_def.is_empty() {
        RouteType::Static
    } else {
        RouteType::Dynamic
    }
}

/// Routes with a file extension, e.g. `/404.html` or `/feed.json`, are written as-is instead of as `index.html` files.
pub fn guess_if_route_is_endpoint(raw_route: &str) -> bool {
    Path::new(raw_route).extension().is_some()
}

fn substitute_params(
    route_template: &str,
    params_def: &[ParameterDef],
    params: &PageParams,
) -> Result<String, BuildError> {
    let mut route = route_template.to_string();

    // Replace from the end so earlier indices stay valid
    for param_def in params_def.iter().rev() {
        let value = params
            .get(&param_def.key)
            .ok_or_else(|| BuildError::MissingParam {
                route: route_template.to_string(),
                param: param_def.key.clone(),
            })?;

        route.replace_range(param_def.index..param_def.index + param_def.length, value);
    }

    Ok(route.replace("\\[", "[").replace("\\]", "]"))
}

pub fn build_url_with_params(
    route_template: &str,
    params: &PageParams,
    is_endpoint: bool,
) -> Result<String, BuildError> {
    let params_def = extract_params_from_raw_route(route_template);
    let route = substitute_params(route_template, &params_def, params)?;

    let mut result = route
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    result.insert(0, '/');

    if !is_endpoint && !result.ends_with('/') {
        result.push('/');
    }

    Ok(result)
}

pub fn build_file_path_with_params(
    route_template: &str,
    params: &PageParams,
    output_dir: &Path,
    is_endpoint: bool,
) -> Result<PathBuf, BuildError> {
    let params_def = extract_params_from_raw_route(route_template);
    let route = substitute_params(route_template, &params_def, params)?;

    let mut path = PathBuf::from(output_dir);
    path.extend(route.split('/').filter(|s| !s.is_empty()));

    if !is_endpoint {
        path.push("index.html");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_params() {
        let input = "/articles/[article]";
        let expected = vec![ParameterDef {
            key: "article".to_string(),
            index: 10,
            length: 9,
        }];

        assert_eq!(extract_params_from_raw_route(input), expected);
    }

    #[test]
    fn test_extract_params_multiple() {
        let params = extract_params_from_raw_route("/articles/[article]/[id]");
        let keys: Vec<&str> = params.iter().map(|p| p.key.as_str()).collect();

        assert_eq!(keys, vec!["article", "id"]);
        assert_eq!(
            get_route_type_from_route_params(&params),
            RouteType::Dynamic
        );
    }

    #[test]
    fn test_extract_params_escaped() {
        let params = extract_params_from_raw_route("/articles/\\[article\\]");

        assert!(params.is_empty());
        assert_eq!(get_route_type_from_route_params(&params), RouteType::Static);
    }

    #[test]
    fn test_url_with_params_of_different_lengths() {
        let params = PageParams::from([("year", "2024"), ("slug", "a-much-longer-slug")]);

        assert_eq!(
            build_url_with_params("/blog/[year]/[slug]", &params, false).unwrap(),
            "/blog/2024/a-much-longer-slug/"
        );
    }

    #[test]
    fn test_url_for_static_and_endpoint_routes() {
        let params = PageParams::default();

        assert_eq!(build_url_with_params("/", &params, false).unwrap(), "/");
        assert_eq!(build_url_with_params("/talks", &params, false).unwrap(), "/talks/");
        assert_eq!(
            build_url_with_params("404.html", &params, true).unwrap(),
            "/404.html"
        );
    }

    #[test]
    fn test_missing_param_is_an_error() {
        let err = build_url_with_params("/blog/[slug]/", &PageParams::default(), false)
            .unwrap_err();

        assert!(matches!(err, BuildError::MissingParam { ref param, .. } if param == "slug"));
    }

    #[test]
    fn test_file_paths() {
        let output = Path::new("dist");
        let params = PageParams::from([("slug", "hello")]);

        assert_eq!(
            build_file_path_with_params("/blog/[slug]/", &params, output, false).unwrap(),
            Path::new("dist/blog/hello/index.html")
        );
        assert_eq!(
            build_file_path_with_params("/", &params, output, false).unwrap(),
            Path::new("dist/index.html")
        );
        assert_eq!(
            build_file_path_with_params("404.html", &params, output, true).unwrap(),
            Path::new("dist/404.html")
        );
    }
}
