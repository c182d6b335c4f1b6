//! Effect 执行器：把网关调用的结果转换回完成动作

use crate::kernel::services::ports::{StorageGateway, StorageResult};
use crate::kernel::{Action, Effect, RequestId};

fn complete<T>(request: RequestId, result: StorageResult<T>, ok: impl FnOnce(T) -> Action) -> Action {
    match result {
        Ok(value) => ok(value),
        Err(error) => Action::GatewayFailed { request, error },
    }
}

/// Runs one storage effect. Effects that do not touch storage yield `None`.
pub async fn execute(gateway: &dyn StorageGateway, effect: Effect) -> Option<Action> {
    let action = match effect {
        Effect::ReadDirectory { request, path } => {
            let result = gateway.read_directory(&path).await;
            complete(request, result, |entries| Action::DirectoryRead { request, entries })
        }
        Effect::CreateFile {
            request,
            dir,
            name,
            content,
        } => {
            let result = gateway.create_file(&dir, &name, &content).await;
            complete(request, result, |path| Action::PathCreated { request, path })
        }
        Effect::CreateFolder { request, path } => {
            let result = gateway.create_folder(&path).await;
            complete(request, result, |()| Action::PathCreated { request, path })
        }
        Effect::Rename { request, from, to } => {
            let result = gateway.rename(&from, &to).await;
            complete(request, result, |()| Action::PathRenamed { request })
        }
        Effect::DeleteRecursive { request, path } => {
            let result = gateway.delete_recursive(&path).await;
            complete(request, result, |()| Action::PathDeleted { request })
        }
        Effect::OpenNote(_) => return None,
    };
    Some(action)
}
