//! Naming - リクエスト型名から正規名（UPPER_SNAKE_CASE）を導出
//!
//! ログ・テレメトリのフィールドと、名前ベースのルーティング（`send_json`）で使う。
//! dispatch の判定には一切影響しない。

/// 型のパスとジェネリクスを除いた短い名前
///
/// `my_app::orders::CreateOrder` → `CreateOrder`
/// `my_app::Envelope<my_app::Inner>` → `Envelope`
pub fn short_type_name<T: ?Sized>() -> &'static str {
    strip_path(std::any::type_name::<T>())
}

/// リクエスト型の正規名
///
/// # 使用例
/// ```ignore
/// assert_eq!(request_name::<CreateOrder>(), "CREATE_ORDER");
/// ```
pub fn request_name<T: ?Sized>() -> String {
    to_upper_snake_case(short_type_name::<T>())
}

/// 識別子を UPPER_SNAKE_CASE に変換
///
/// 単語境界:
/// - 小文字/数字 → 大文字（`getOrder` → `GET_ORDER`）
/// - 略語の終わり（`HTTPRequest` → `HTTP_REQUEST`）
/// - 既存の `_` / `-` / 空白は 1 つの `_` にまとめる
pub fn to_upper_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }

        out.extend(c.to_uppercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

pub(crate) fn strip_path(full: &str) -> &str {
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct CreateOrder;
    struct Wrapper<T>(T);

    #[rstest]
    #[case("CreateOrder", "CREATE_ORDER")]
    #[case("GetOrder", "GET_ORDER")]
    #[case("getOrderById", "GET_ORDER_BY_ID")]
    #[case("HTTPRequest", "HTTP_REQUEST")]
    #[case("Order2Fa", "ORDER2_FA")]
    #[case("already_snake", "ALREADY_SNAKE")]
    #[case("kebab-case name", "KEBAB_CASE_NAME")]
    #[case("Trailing_", "TRAILING")]
    #[case("X", "X")]
    #[case("", "")]
    fn upper_snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_upper_snake_case(input), expected);
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(short_type_name::<CreateOrder>(), "CreateOrder");
    }

    #[test]
    fn short_name_strips_generics() {
        assert_eq!(short_type_name::<Wrapper<CreateOrder>>(), "Wrapper");
    }

    #[test]
    fn request_name_is_upper_snake() {
        assert_eq!(request_name::<CreateOrder>(), "CREATE_ORDER");
    }
}
