use std::sync::Arc;

use super::{
    guard::Guard,
    table::{Route, RouteTable, WILDCARD},
};

pub const LAYOUT: &str = "AppLayoutComponent";
pub const LAYOUT_MAIN: &str = "AppLayoutMainComponent";

/// app_routes
///
/// The application shell's route table:
///
/// - `""`: public layout, lazily loads `signin`.
/// - `main/{files,form,home,list}`: main layout behind `guard`, one lazy module
///   per leaf.
/// - anything else redirects to `""`.
pub fn app_routes(guard: Arc<dyn Guard>) -> RouteTable {
    RouteTable::new([
        Route::new("")
            .component(LAYOUT)
            .children([Route::new("").load_children("signin")]),
        Route::new("main")
            .component(LAYOUT_MAIN)
            .can_activate(guard)
            .children([
                Route::new("files").load_children("files"),
                Route::new("form").load_children("form"),
                Route::new("home").load_children("home"),
                Route::new("list").load_children("list"),
            ]),
        Route::new(WILDCARD).redirect_to(""),
    ])
}
