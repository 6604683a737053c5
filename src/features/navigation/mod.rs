//! 画面遷移の境界
//!
//! ルーティングそのものは外部に任せ、コアは`Navigator`を呼ぶだけ
use std::fmt;

/// 遷移先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// 請求書一覧
    Bills,
    /// 新規請求書フォーム
    NewBill,
}

impl Route {
    /// ルートのパスを取得
    pub fn path(&self) -> &'static str {
        match self {
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 注入される遷移関数
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Bills.path(), "#employee/bills");
        assert_eq!(Route::NewBill.to_string(), "#employee/bill/new");
    }

    #[test]
    fn test_closure_navigator() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let navigator = move |route: Route| sink.lock().unwrap().push(route);

        navigator.navigate(Route::NewBill);
        navigator.navigate(Route::Bills);

        assert_eq!(*visited.lock().unwrap(), vec![Route::NewBill, Route::Bills]);
    }
}
