#![forbid(unsafe_code)]

use fluxradar_core::{Field, Resource, ResourceKind, ResourceType, Status};
use fluxradar_view::{choice, cluster_overview, derive, facets, paginate, Direction, Filter, PageSize, ViewState};

fn rec(cluster: &str, name: &str, status: &str) -> Resource {
    Resource::new(format!("{cluster}-{name}"), &ResourceKind::Kustomization, ResourceType::Flux, name, "flux-system", status)
        .with_cluster(cluster)
}

fn dataset() -> Vec<Resource> {
    let mut v = Vec::new();
    for (ci, cluster) in ["X", "Y", "Z"].iter().enumerate() {
        for i in 0..6 {
            let status = if (i + ci) % 2 == 0 { "Error" } else { "Ready" };
            v.push(rec(cluster, &format!("app-{i}"), status));
        }
    }
    v
}

#[test]
fn filter_is_a_conjunction() {
    let items = dataset();
    let f = Filter { cluster: choice("X"), status: choice("Error"), ..Filter::default() };
    let got: Vec<&str> = f.apply(&items).into_iter().map(|r| r.id()).collect();
    let expected: Vec<&str> = items
        .iter()
        .filter(|r| r.cluster() == "X" && r.raw_status() == "Error")
        .map(|r| r.id())
        .collect();
    assert_eq!(got, expected);
    assert_eq!(got.len(), 3);

    let all = Filter { cluster: choice("all"), status: choice("all"), ..Filter::default() };
    assert_eq!(all.apply(&items).len(), items.len());
}

#[test]
fn filter_by_every_selector() {
    let mut items = dataset();
    items.push(
        Resource::new("w", &ResourceKind::Deployment, ResourceType::K8s, "web-frontend", "shop", "Available").with_cluster("Y"),
    );
    let f = Filter {
        cluster: choice("Y"),
        resource_type: choice("k8s"),
        status: choice("Available"),
        namespace: choice("shop"),
        kind: choice("Deployment"),
        search: "FRONT".to_string(),
    };
    let got = f.apply(&items);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id(), "w");

    let miss = Filter { namespace: choice("flux-system"), ..f };
    assert!(miss.apply(&items).is_empty());
}

#[test]
fn pagination_boundary_clamps_to_last_page() {
    let items: Vec<Resource> = (0..25).map(|i| rec("X", &format!("r{i:02}"), "Ready")).collect();
    let size = PageSize::new(10).unwrap();

    let p3 = paginate(&items, 3, size);
    assert_eq!(p3.rows.len(), 5);
    assert_eq!(p3.rows[0].name(), "r20");
    assert_eq!((p3.page, p3.total_pages, p3.total), (3, 3, 25));

    let p4 = paginate(&items, 4, size);
    assert_eq!(p4.page, 3);
    assert_eq!(p4.rows, p3.rows);

    let p0 = paginate(&items, 0, size);
    assert_eq!(p0.page, 1);
    assert_eq!(p0.rows.len(), 10);
}

#[test]
fn shrinking_filter_clamps_current_page() {
    let items: Vec<Resource> = (0..25).map(|i| rec("X", &format!("r{i:02}"), if i < 12 { "Ready" } else { "Error" })).collect();
    let mut state = ViewState::default();
    state.go_to(3);
    assert_eq!(derive(&items, &state).page.rows.len(), 5);

    // A filter change resets to page 1; a stale page request is clamped instead.
    state.set_filter(Filter { status: choice("Ready"), ..Filter::default() });
    assert_eq!(state.page(), 1);
    state.go_to(3);
    let v = derive(&items, &state);
    assert_eq!((v.page.page, v.page.total_pages, v.page.rows.len()), (2, 2, 2));
}

#[test]
fn sort_by_chosen_key_and_direction() {
    let items = vec![
        rec("X", "beta", "Ready"),
        rec("X", "Alpha", "Error"),
        rec("X", "gamma", "Suspended"),
        Resource::from_value(serde_json::json!({"id": "nameless", "cluster": "X"})),
    ];
    let mut state = ViewState::default();
    let names = |s: &ViewState| derive(&items, s).page.rows.iter().map(|r| r.id().to_string()).collect::<Vec<_>>();
    assert_eq!(names(&state), ["nameless", "X-Alpha", "X-beta", "X-gamma"]);

    state.request_sort(Field::Name);
    assert_eq!(state.sort().direction, Direction::Descending);
    assert_eq!(names(&state), ["X-gamma", "X-beta", "X-Alpha", "nameless"]);

    state.request_sort(Field::Status);
    // "" < Error < Ready < Suspended
    assert_eq!(names(&state), ["nameless", "X-Alpha", "X-beta", "X-gamma"]);
}

#[test]
fn unknown_status_counts_as_unknown_without_mutation() {
    let items = vec![rec("X", "a", "Bogus"), rec("X", "b", "Ready"), rec("X", "c", "Unknown")];
    let ov = cluster_overview(&items);
    assert_eq!(ov.len(), 1);
    assert_eq!(ov[0].counts.get(Status::Unknown), 2);
    assert_eq!(ov[0].counts.get(Status::Ready), 1);
    assert_eq!(ov[0].counts.total, 3);
    assert_eq!(items[0].raw_status(), "Bogus");
    assert_eq!(items[0].status(), Status::Unknown);
}

#[test]
fn overview_ignores_active_filter_and_tracks_latest_transition() {
    let items = vec![
        rec("X", "a", "Ready").with_last_transition("2024-05-01T10:00:00Z"),
        rec("Y", "b", "Error").with_last_transition("2024-05-02T10:00:00+02:00"),
        rec("X", "c", "Failed").with_last_transition("2024-05-03T09:00:00Z"),
        rec("X", "d", "Ready").with_last_transition("not a timestamp"),
        rec("X", "e", "Ready"),
    ];
    let mut state = ViewState::default();
    state.set_filter(Filter { cluster: choice("Y"), ..Filter::default() });
    let v = derive(&items, &state);
    assert_eq!(v.page.total, 1);

    let clusters: Vec<&str> = v.overview.iter().map(|o| o.cluster.as_str()).collect();
    assert_eq!(clusters, ["X", "Y"]);
    let x = &v.overview[0];
    assert_eq!(x.counts.total, 4);
    assert_eq!(x.counts.get(Status::Ready), 3);
    assert_eq!(x.counts.get(Status::Failed), 1);
    assert_eq!(x.latest.as_deref(), Some("2024-05-03T09:00:00Z"));
    assert_eq!(v.overview[1].latest.as_deref(), Some("2024-05-02T10:00:00+02:00"));

    let nonzero: Vec<_> = x.counts.nonzero().collect();
    assert_eq!(nonzero, [(Status::Ready, 3), (Status::Failed, 1)]);
}

#[test]
fn facets_list_distinct_choices() {
    let mut items = dataset();
    items.push(Resource::new("p", &ResourceKind::Pod, ResourceType::K8s, "p", "apps", "Running").with_cluster("W"));
    let f = facets(&items);
    assert_eq!(f.clusters, ["X", "Y", "Z", "W"]);
    assert_eq!(f.namespaces, ["apps", "flux-system"]);
    assert_eq!(f.kinds, ["Kustomization", "Pod"]);
}

#[test]
fn page_size_change_resets_page() {
    let mut state = ViewState::default();
    state.go_to(4);
    state.set_page_size(PageSize::new(50).unwrap());
    assert_eq!(state.page(), 1);
}
