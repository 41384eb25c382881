//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the store serve requests? Failure → pulled from load-balancer. |

use tracing::warn;

use crate::resource::PostResource;
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`. No dependencies.
pub async fn liveness(_posts: PostResource, _req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` when the store answers a ping, otherwise
/// `503 Service Unavailable`.
pub async fn readiness(posts: PostResource, _req: Request) -> Response {
    match posts.store().ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::status(Status::ServiceUnavailable)
        }
    }
}
