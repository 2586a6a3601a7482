//! Component-model export (wasm32 only).

wit_bindgen::generate!({
    world: "reconciler",
    path: "../../wit",
});

struct Component;

impl Guest for Component {
    fn reconcile(object: String) -> Result<ReconcileResult, ReconcileError> {
        crate::registry::call(&object)
            .map(|ok| ReconcileResult {
                requeue: ok.requeue,
                requeue_after: ok.requeue_after,
                object: ok.object,
            })
            .map_err(|err| ReconcileError {
                code: err.code,
                message: err.message,
            })
    }
}

export!(Component);
