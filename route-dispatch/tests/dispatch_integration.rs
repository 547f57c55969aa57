//! End-to-end dispatch through the public API
//! Run: cargo test -p route-dispatch --test dispatch_integration

use route_dispatch::prelude::*;
use route_dispatch::{ROUTE_ATTRIBUTE, output};
use std::sync::{Arc, Mutex};

type Trail = Arc<Mutex<Vec<String>>>;

fn tracer(name: &'static str, trail: &Trail) -> MiddlewareFn {
    let trail = trail.clone();
    from_fn(move |req, res, next| {
        // Middleware can introspect the matched route
        let route = req
            .route_info()
            .map(|info| info.pattern.clone())
            .unwrap_or_default();
        trail.lock().unwrap().push(format!("{} > {}", name, route));
        let res = next(req, res)?;
        trail.lock().unwrap().push(format!("{} <", name));
        Ok(res)
    })
}

#[test]
fn dispatch_blog_post() {
    let trail: Trail = Arc::new(Mutex::new(Vec::new()));

    let registry = HandlerRegistry::new().register(
        "posts.show",
        handler(|req: Request, _res, args: &Arguments| {
            echo!("<!-- rendered for {} -->", req.path());
            Ok(format!("<h1>{} #{}</h1>", args["blog"], args["post"]))
        }),
    );

    let mut routes = RouteCollector::new()
        .with_settings(RouteSettings::from_json(r#"{"output_capture": "append"}"#).unwrap())
        .with_container(Arc::new(registry));

    let mut site = RouteGroup::new("/blogs/{blog}");
    site.add(tracer("site", &trail));

    let mut id = None;
    routes
        .group(site, |routes| {
            let mut posts = RouteGroup::new("/posts");
            posts.add(tracer("posts", &trail));
            routes.group(posts, |routes| {
                let route = routes.get("/{post}", "posts.show")?;
                route.set_name("posts.show")?;
                route.add(tracer("route", &trail))?;
                id = Some(route.identifier());
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
    routes.finalize_all();

    let id = id.unwrap();
    assert_eq!(routes.named("posts.show").unwrap().identifier(), id);

    let matched: Arguments = [("blog", "rust"), ("post", "42")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let res = routes
        .dispatch(
            id,
            Request::new("GET", "/blogs/rust/posts/42"),
            Response::new().with_header("content-type", "text/html"),
            matched,
        )
        .unwrap();

    assert_eq!(
        res.body().contents(),
        "<h1>rust #42</h1><!-- rendered for /blogs/rust/posts/42 -->"
    );
    assert_eq!(res.header("Content-Type"), Some("text/html"));
    assert_eq!(
        *trail.lock().unwrap(),
        vec![
            "site > /blogs/{blog}/posts/{post}",
            "posts > /blogs/{blog}/posts/{post}",
            "route > /blogs/{blog}/posts/{post}",
            "route <",
            "posts <",
            "site <",
        ]
    );
    assert_eq!(output::depth(), 0);
}

#[test]
fn prepare_then_run_by_hand() {
    let mut route = Route::new(
        ["GET", "HEAD"],
        "/files/{name}",
        handler(|_req, res: Response, args: &Arguments| {
            Ok(res.with_status(200).with_body(format!("file {}", args["name"])))
        }),
        Vec::new(),
    )
    .unwrap();
    route.set_output_capture("disabled").unwrap();
    route.finalize();

    let req = route.prepare(
        Request::new("HEAD", "/files/a.txt"),
        Arguments::from([("name".to_string(), "a.txt".to_string())]),
    );
    assert!(req.attribute(ROUTE_ATTRIBUTE).is_some());

    let res = route.run(req, Response::new().with_status(500)).unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.body().contents(), "file a.txt");
}
